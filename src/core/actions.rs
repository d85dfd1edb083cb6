//! Modify operations: build an action batch, submit it, and check what the
//! service says it did with each action.
//!
//! A batch only counts as applied when the response status is 1 and every
//! per-action result is truthy. Anything else comes back as
//! `PocketError::Rejected` with one `ActionOutcome` per submitted action, so
//! callers can see exactly which items were not touched.

use crate::core::client::PocketClient;
use crate::domain::model::{
    Action, ActionKind, ActionOutcome, Endpoint, ModifyOutcome, ModifyRequest, ModifyResponse,
    Session,
};
use crate::domain::ports::{PocketApi, Transport};
use crate::utils::error::{PocketError, Result};
use crate::utils::validation::{validate_credential, Validate};

impl<T: Transport> PocketClient<T> {
    /// Raw submission of an already-built batch. No result checking.
    pub async fn send_actions(&self, request: &ModifyRequest) -> Result<ModifyResponse> {
        tracing::debug!("📤 Sending {} action(s)", request.actions().len());
        self.call(Endpoint::Modify, request).await
    }
}

/// Applies one `action` to `item_id`. `args` are the action's extra
/// parameters (tags for the `tags_*` family, old/new names for `tag_rename`).
pub async fn modify<A: PocketApi + ?Sized>(
    api: &A,
    session: &Session,
    action: &str,
    item_id: i64,
    args: &[String],
) -> Result<ModifyOutcome> {
    // Checked first and on its own: this is the error new users hit.
    validate_credential("consumer_key", &session.consumer_key)?;

    let kind = ActionKind::parse(action, args)?;
    modify_batch(api, session, vec![Action::new(kind, item_id)]).await
}

/// Submits `actions` in order as a single request.
pub async fn modify_batch<A: PocketApi + ?Sized>(
    api: &A,
    session: &Session,
    actions: Vec<Action>,
) -> Result<ModifyOutcome> {
    session.validate()?;
    let request = ModifyRequest::new(session, actions)?;

    let response = api.modify(&request).await.inspect_err(|e| {
        tracing::error!("❌ modify: {}", e);
    })?;

    evaluate(&request, &response)
}

/// Matches each submitted action with its result.
pub fn evaluate(request: &ModifyRequest, response: &ModifyResponse) -> Result<ModifyOutcome> {
    let expected = request.actions().len();
    let received = response.action_results.len();

    if response.status == 1 && received != expected {
        return Err(PocketError::Malformed {
            endpoint: Endpoint::Modify,
            message: format!("sent {} action(s) but got {} result(s)", expected, received),
        });
    }

    let outcomes: Vec<ActionOutcome> = request
        .actions()
        .iter()
        .enumerate()
        .map(|(index, action)| ActionOutcome {
            action: action.name().to_string(),
            item_id: action.item_id,
            succeeded: response.action_succeeded(index),
            error: response.action_error(index),
        })
        .collect();

    let outcome = ModifyOutcome {
        status: response.status,
        outcomes,
    };

    if outcome.all_succeeded() {
        tracing::info!("✅ Applied {} action(s)", expected);
        Ok(outcome)
    } else {
        for failed in outcome.outcomes.iter().filter(|o| !o.succeeded) {
            tracing::warn!(
                "🔶 {} on item {} was not applied: {}",
                failed.action,
                failed.item_id,
                failed.error.as_deref().unwrap_or("no reason given")
            );
        }
        Err(PocketError::Rejected {
            status: outcome.status,
            outcomes: outcome.outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::HttpMethod;
    use crate::testing::{MockCall, MockPocket, RecordingTransport};
    use crate::utils::error::ErrorKind;
    use std::error::Error;
    use std::sync::Arc;

    fn session() -> Session {
        Session::new("abc123", "tok")
    }

    #[tokio::test]
    async fn test_empty_consumer_key_fails_before_transport() {
        let transport = Arc::new(RecordingTransport::new());
        let client = PocketClient::with_transport(transport.clone());

        let err = modify(&client, &Session::new("", "tok"), "archive", 42, &[])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConfigError);
        assert!(err.to_string().contains("consumer_key"));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_archive_builds_single_action_batch() {
        let pocket = MockPocket::new();

        let outcome = modify(&pocket, &session(), "archive", 42, &[]).await.unwrap();
        assert!(outcome.all_succeeded());

        let calls = pocket.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            MockCall::Modify(request) => {
                assert_eq!(request.actions().len(), 1);
                assert_eq!(request.actions()[0].name(), "archive");
                assert_eq!(request.actions()[0].item_id, 42);
                assert_eq!(request.consumer_key, "abc123");
                assert_eq!(request.access_token, "tok");
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tag_args_are_serialised() {
        let transport = Arc::new(
            RecordingTransport::new().respond_json(r#"{"status":1,"action_results":[true]}"#),
        );
        let client = PocketClient::with_transport(transport.clone());

        modify(
            &client,
            &session(),
            "tags_add",
            7,
            &["rust".to_string(), "cli".to_string()],
        )
        .await
        .unwrap();

        let call = &transport.calls()[0];
        assert_eq!(call.method, HttpMethod::Post);
        assert_eq!(call.endpoint, Endpoint::Modify);
        assert_eq!(
            call.json(),
            serde_json::json!({
                "consumer_key": "abc123",
                "access_token": "tok",
                "actions": [{"action": "tags_add", "tags": "rust,cli", "item_id": 7}]
            })
        );
    }

    #[tokio::test]
    async fn test_network_failure_keeps_cause() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let transport = Arc::new(RecordingTransport::new().fail_with(PocketError::Network {
            endpoint: Endpoint::Modify,
            source: Box::new(refused),
        }));
        let client = PocketClient::with_transport(transport);

        let err = modify(&client, &session(), "archive", 42, &[])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NetworkError);
        let cause = err.source().expect("network error should chain its cause");
        assert_eq!(cause.to_string(), "refused");
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected_locally() {
        let pocket = MockPocket::new();

        let err = modify(&pocket, &session(), "shred", 42, &[]).await.unwrap_err();
        assert!(matches!(err, PocketError::InvalidRequest { .. }));
        assert!(pocket.calls().is_empty());
    }

    #[tokio::test]
    async fn test_partial_batch_failure_reports_each_action() {
        let pocket = MockPocket::new().with_modify_response(ModifyResponse {
            status: 1,
            action_results: vec![serde_json::json!(true), serde_json::json!(false)],
            action_errors: Some(vec![
                serde_json::Value::Null,
                serde_json::json!({"message": "Item not found", "code": 422}),
            ]),
        });

        let err = modify_batch(
            &pocket,
            &session(),
            vec![
                Action::new(ActionKind::Archive, 1),
                Action::new(ActionKind::Favorite, 2),
            ],
        )
        .await
        .unwrap_err();

        match err {
            PocketError::Rejected { status, outcomes } => {
                assert_eq!(status, 1);
                assert!(outcomes[0].succeeded);
                assert!(!outcomes[1].succeeded);
                assert_eq!(outcomes[1].item_id, 2);
                assert_eq!(outcomes[1].error.as_deref(), Some("Item not found"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_zero_is_rejection() {
        let pocket = MockPocket::new().with_modify_response(ModifyResponse {
            status: 0,
            action_results: vec![],
            action_errors: None,
        });

        let err = modify(&pocket, &session(), "delete", 9, &[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteRejection);
    }

    #[test]
    fn test_result_count_mismatch_is_malformed() {
        let request = ModifyRequest::new(
            &session(),
            vec![
                Action::new(ActionKind::Archive, 1),
                Action::new(ActionKind::Archive, 2),
            ],
        )
        .unwrap();
        let response = ModifyResponse {
            status: 1,
            action_results: vec![serde_json::json!(true)],
            action_errors: None,
        };

        let err = evaluate(&request, &response).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtocolError);
    }
}
