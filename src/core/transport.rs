use crate::config::{Endpoints, HttpSettings};
use crate::domain::model::{Endpoint, HttpMethod};
use crate::domain::ports::Transport;
use crate::utils::error::{PocketError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT_CHARSET, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const JSON: &str = "application/json";

/// reqwest-backed transport. Cloning is cheap and clones share one
/// connection pool, one endpoint table and one cancellation token.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoints: Arc<Endpoints>,
    timeout: Duration,
    cancel: CancellationToken,
}

impl HttpTransport {
    pub fn new(endpoints: Endpoints, http: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(http.connect_timeout())
            .timeout(http.timeout())
            .build()
            .map_err(|e| PocketError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoints: Arc::new(endpoints),
            timeout: http.timeout(),
            cancel: CancellationToken::new(),
        })
    }

    /// Every in-flight request is abandoned as soon as `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn exchange(
        &self,
        method: HttpMethod,
        endpoint: Endpoint,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let method = match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        let url = self.endpoints.url(endpoint);

        let response = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT_CHARSET, "UTF-8")
            .header("charset", "UTF8")
            .header("X-Accept", JSON)
            .body(payload)
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        tracing::debug!("📡 {}: response status {}", endpoint, response.status());

        if !response.status().is_success() {
            return Err(status_error(endpoint, response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;
        Ok(body.to_vec())
    }

    fn transport_error(&self, endpoint: Endpoint, err: reqwest::Error) -> PocketError {
        if err.is_timeout() {
            PocketError::Timeout {
                endpoint,
                after: self.timeout,
            }
        } else {
            PocketError::Network {
                endpoint,
                source: Box::new(err),
            }
        }
    }
}

// Pocket explains rejections in the X-Error / X-Error-Code headers, not the body.
async fn status_error(endpoint: Endpoint, response: Response) -> PocketError {
    let status = response.status().as_u16();
    let (message, code) = {
        let headers = response.headers();
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let message = header("X-Error");
        let code = header("X-Error-Code").and_then(|c| c.trim().parse::<u32>().ok());
        (message, code)
    };

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(
        "❌ {}: HTTP {} (X-Error: {:?}, X-Error-Code: {:?}) body: {}",
        endpoint,
        status,
        message,
        code,
        body
    );

    PocketError::Status {
        endpoint,
        status,
        message,
        code,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: HttpMethod,
        endpoint: Endpoint,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>> {
        tracing::debug!(
            "📡 {}: {:?} {} ({} bytes)",
            endpoint,
            method,
            self.endpoints.url(endpoint),
            payload.len()
        );
        let started = Instant::now();

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PocketError::Cancelled { endpoint }),
            outcome = tokio::time::timeout(self.timeout, self.exchange(method, endpoint, payload)) => {
                outcome.unwrap_or(Err(PocketError::Timeout { endpoint, after: self.timeout }))
            }
        };

        tracing::debug!("📡 {}: finished in {:?}", endpoint, started.elapsed());
        result
    }
}

pub fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(body)?)
}

/// Decodes a response body, naming the endpoint on failure.
pub fn decode<R: DeserializeOwned>(endpoint: Endpoint, body: &[u8]) -> Result<R> {
    serde_json::from_slice(body).map_err(|source| {
        tracing::debug!(
            "❌ {}: undecodable body: {}",
            endpoint,
            String::from_utf8_lossy(body)
        );
        PocketError::Decode { endpoint, source }
    })
}
