use crate::core::client::PocketClient;
use crate::domain::model::{Endpoint, ItemRequest};
use crate::domain::ports::Transport;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use serde::de::DeserializeOwned;

impl<T: Transport> PocketClient<T> {
    /// Fetches items matching `request`, decoding into whatever shape the
    /// caller wants. Filters and paging are passed through as-is.
    pub async fn retrieve_as<R: DeserializeOwned>(&self, request: &ItemRequest) -> Result<R> {
        request.validate()?;
        tracing::debug!(
            "📥 Retrieving items (count: {:?}, offset: {:?})",
            request.count,
            request.offset
        );
        self.call(Endpoint::Retrieve, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ItemState, RetrieveResponse, Session};
    use crate::domain::ports::PocketApi;
    use crate::testing::RecordingTransport;
    use crate::utils::error::ErrorKind;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_retrieve_passes_filters_through() {
        let transport = Arc::new(RecordingTransport::new().respond_json(
            r#"{"status":1,"list":{"1":{"item_id":"1","given_title":"First"}}}"#,
        ));
        let client = PocketClient::with_transport(transport.clone());

        let request = ItemRequest {
            state: Some(ItemState::Archive),
            tag: Some("rust".to_string()),
            offset: Some(20),
            ..ItemRequest::new(&Session::new("key", "tok"))
        };
        let response = client.retrieve(&request).await.unwrap();

        assert_eq!(response.list["1"].title(), "First");
        let sent = transport.calls()[0].json();
        assert_eq!(sent["state"], "archive");
        assert_eq!(sent["tag"], "rust");
        assert_eq!(sent["offset"], 20);
        assert!(sent.get("count").is_none());
    }

    #[tokio::test]
    async fn test_retrieve_into_caller_type() {
        let transport =
            Arc::new(RecordingTransport::new().respond_json(r#"{"status":1,"list":[]}"#));
        let client = PocketClient::with_transport(transport);

        let raw: serde_json::Value = client
            .retrieve_as(&ItemRequest::new(&Session::new("key", "tok")))
            .await
            .unwrap();
        assert_eq!(raw["status"], 1);
    }

    #[tokio::test]
    async fn test_retrieve_requires_access_token() {
        let transport = Arc::new(RecordingTransport::new());
        let client = PocketClient::with_transport(transport.clone());

        let err = client
            .retrieve_as::<RetrieveResponse>(&ItemRequest::new(&Session::new("key", "")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigError);
        assert_eq!(transport.call_count(), 0);
    }
}
