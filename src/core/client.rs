use crate::config::Settings;
use crate::core::transport::{decode, encode, HttpTransport};
use crate::domain::model::{
    AccessGrant, Credential, Endpoint, HttpMethod, ItemRequest, ModifyRequest, ModifyResponse,
    RequestToken, RetrieveResponse,
};
use crate::domain::ports::{PocketApi, Transport};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Pocket client over any `Transport`. Holds no per-user state; credentials
/// travel with each call.
pub struct PocketClient<T: Transport = HttpTransport> {
    transport: T,
}

impl PocketClient<HttpTransport> {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let transport = HttpTransport::new(settings.endpoints.clone(), &settings.http)?;
        Ok(Self::with_transport(transport))
    }

    pub fn with_cancellation(self, token: CancellationToken) -> Self {
        Self::with_transport(self.transport.with_cancellation(token))
    }
}

impl<T: Transport> PocketClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Encode, send once, decode.
    pub(crate) async fn call<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let payload = encode(body)?;
        let raw = self
            .transport
            .send(HttpMethod::Post, endpoint, payload)
            .await?;
        decode(endpoint, &raw)
    }
}

#[async_trait]
impl<T: Transport> PocketApi for PocketClient<T> {
    async fn authenticate(&self, credential: &Credential) -> Result<RequestToken> {
        self.request_token(credential).await
    }

    async fn authorise(&self, credential: &Credential, code: &str) -> Result<AccessGrant> {
        self.exchange_code(credential, code).await
    }

    async fn retrieve(&self, request: &ItemRequest) -> Result<RetrieveResponse> {
        self.retrieve_as(request).await
    }

    async fn modify(&self, request: &ModifyRequest) -> Result<ModifyResponse> {
        self.send_actions(request).await
    }
}
