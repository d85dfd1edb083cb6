use crate::domain::model::{
    AccessGrant, Credential, Endpoint, HttpMethod, ItemRequest, ModifyRequest, ModifyResponse,
    RequestToken, RetrieveResponse,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// One HTTP exchange against a fixed endpoint. Implementations make exactly
/// one attempt and hand back the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: HttpMethod, endpoint: Endpoint, payload: Vec<u8>)
        -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        method: HttpMethod,
        endpoint: Endpoint,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>> {
        (**self).send(method, endpoint, payload).await
    }
}

/// Everything a caller can ask of Pocket.
#[async_trait]
pub trait PocketApi: Send + Sync {
    async fn authenticate(&self, credential: &Credential) -> Result<RequestToken>;

    /// `code` must come from an earlier `authenticate` with the same credential
    /// and the user must have approved it in a browser in between.
    async fn authorise(&self, credential: &Credential, code: &str) -> Result<AccessGrant>;

    async fn retrieve(&self, request: &ItemRequest) -> Result<RetrieveResponse>;

    async fn modify(&self, request: &ModifyRequest) -> Result<ModifyResponse>;
}
