use anyhow::Result;
use httpmock::prelude::*;
use pocket_lint::core::{Action, ActionKind, Session};
use pocket_lint::{modify, modify_batch, Endpoints, ErrorKind, PocketClient, PocketError, Settings};

fn client_for(server: &MockServer) -> Result<PocketClient> {
    let settings = Settings {
        consumer_key: "abc123".to_string(),
        access_token: Some("tok".to_string()),
        endpoints: Endpoints::with_base_url(&server.base_url()),
        ..Settings::default()
    };
    Ok(PocketClient::from_settings(&settings)?)
}

fn session() -> Session {
    Session::new("abc123", "tok")
}

#[tokio::test]
async fn test_archive_posts_single_action_batch() -> Result<()> {
    let server = MockServer::start();
    let client = client_for(&server)?;

    let send_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v3/send")
            .header("content-type", "application/json")
            .json_body(serde_json::json!({
                "consumer_key": "abc123",
                "access_token": "tok",
                "actions": [{"action": "archive", "item_id": 42}]
            }));
        then.status(200)
            .json_body(serde_json::json!({"status": 1, "action_results": [true]}));
    });

    let outcome = modify(&client, &session(), "archive", 42, &[]).await?;

    send_mock.assert();
    assert!(outcome.all_succeeded());
    assert_eq!(outcome.outcomes.len(), 1);
    assert_eq!(outcome.outcomes[0].action, "archive");
    Ok(())
}

#[tokio::test]
async fn test_batch_keeps_submission_order() -> Result<()> {
    let server = MockServer::start();
    let client = client_for(&server)?;

    let send_mock = server.mock(|when, then| {
        when.method(POST).path("/v3/send").json_body(serde_json::json!({
            "consumer_key": "abc123",
            "access_token": "tok",
            "actions": [
                {"action": "tags_replace", "tags": "later", "item_id": 3},
                {"action": "favorite", "item_id": 1},
                {"action": "archive", "item_id": 2}
            ]
        }));
        then.status(200)
            .json_body(serde_json::json!({"status": 1, "action_results": [true, true, true]}));
    });

    let outcome = modify_batch(
        &client,
        &session(),
        vec![
            Action::new(
                ActionKind::TagsReplace {
                    tags: "later".to_string(),
                },
                3,
            ),
            Action::new(ActionKind::Favorite, 1),
            Action::new(ActionKind::Archive, 2),
        ],
    )
    .await?;

    send_mock.assert();
    let ids: Vec<i64> = outcome.outcomes.iter().map(|o| o.item_id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    Ok(())
}

#[tokio::test]
async fn test_rejected_action_is_remote_rejection() -> Result<()> {
    let server = MockServer::start();
    let client = client_for(&server)?;

    server.mock(|when, then| {
        when.method(POST).path("/v3/send");
        then.status(200).json_body(serde_json::json!({
            "status": 1,
            "action_results": [false],
            "action_errors": [{"message": "Invalid item id", "type": "Bad Request", "code": 422}]
        }));
    });

    let err = modify(&client, &session(), "favorite", 999, &[])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteRejection);
    match err {
        PocketError::Rejected { outcomes, .. } => {
            assert_eq!(outcomes[0].item_id, 999);
            assert_eq!(outcomes[0].error.as_deref(), Some("Invalid item id"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_expired_token_is_protocol_error() -> Result<()> {
    let server = MockServer::start();
    let client = client_for(&server)?;

    server.mock(|when, then| {
        when.method(POST).path("/v3/send");
        then.status(401)
            .header("X-Error", "Invalid access token.")
            .header("X-Error-Code", "107");
    });

    let err = modify(&client, &session(), "archive", 42, &[])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProtocolError);
    assert!(err.recovery_suggestion().contains("auth"));
    Ok(())
}

#[tokio::test]
async fn test_missing_keys_never_hit_the_server() -> Result<()> {
    let server = MockServer::start();
    let client = client_for(&server)?;

    let send_mock = server.mock(|when, then| {
        when.method(POST).path("/v3/send");
        then.status(200)
            .json_body(serde_json::json!({"status": 1, "action_results": [true]}));
    });

    let no_key = modify(&client, &Session::new("", "tok"), "archive", 42, &[])
        .await
        .unwrap_err();
    let no_token = modify(&client, &Session::new("abc123", ""), "archive", 42, &[])
        .await
        .unwrap_err();
    let bad_args = modify(&client, &session(), "tag_rename", 42, &["one".to_string()])
        .await
        .unwrap_err();

    assert!(no_key.to_string().contains("consumer_key"));
    assert!(no_token.to_string().contains("access_token"));
    assert_eq!(bad_args.kind(), ErrorKind::ConfigError);
    send_mock.assert_hits(0);
    Ok(())
}
