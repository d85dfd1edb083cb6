//! Test doubles for both seams: `RecordingTransport` stands in for the
//! network under a real `PocketClient`, `MockPocket` stands in for the whole
//! client.

use crate::domain::model::{
    AccessGrant, Credential, Endpoint, HttpMethod, ItemRequest, ModifyRequest, ModifyResponse,
    RequestToken, RetrieveResponse,
};
use crate::domain::ports::{PocketApi, Transport};
use crate::utils::error::{PocketError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub endpoint: Endpoint,
    pub payload: Vec<u8>,
}

impl RecordedCall {
    pub fn body(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.payload).unwrap_or(serde_json::Value::Null)
    }
}

/// Replays scripted responses in order and records every request it sees.
/// Running out of script is reported as a network error.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    script: Mutex<VecDeque<Result<Vec<u8>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(self, body: &str) -> Self {
        self.push(Ok(body.as_bytes().to_vec()));
        self
    }

    pub fn fail_with(self, error: PocketError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, response: Result<Vec<u8>>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(response);
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        method: HttpMethod,
        endpoint: Endpoint,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                method,
                endpoint,
                payload,
            });
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| {
            Err(PocketError::Network {
                endpoint,
                source: "no scripted response left".into(),
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Authenticate(Credential),
    Authorise(Credential, String),
    Retrieve(ItemRequest),
    Modify(ModifyRequest),
}

/// In-memory `PocketApi`. Answers with canned values, applies the same
/// credential checks as the real client, and records every call.
#[derive(Debug)]
pub struct MockPocket {
    pub request_token: RequestToken,
    pub grant: AccessGrant,
    pub items: RetrieveResponse,
    modify_response: Option<ModifyResponse>,
    calls: Mutex<Vec<MockCall>>,
}

impl Default for MockPocket {
    fn default() -> Self {
        Self {
            request_token: RequestToken {
                code: "mock-code".to_string(),
                state: None,
            },
            grant: AccessGrant {
                access_token: "mock-token".to_string(),
                username: "mock-user".to_string(),
            },
            items: RetrieveResponse::default(),
            modify_response: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockPocket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(mut self, items: RetrieveResponse) -> Self {
        self.items = items;
        self
    }

    /// Without an explicit response every action in a batch succeeds.
    pub fn with_modify_response(mut self, response: ModifyResponse) -> Self {
        self.modify_response = Some(response);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: MockCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl PocketApi for MockPocket {
    async fn authenticate(&self, credential: &Credential) -> Result<RequestToken> {
        credential.validate()?;
        self.record(MockCall::Authenticate(credential.clone()));
        Ok(self.request_token.clone())
    }

    async fn authorise(&self, credential: &Credential, code: &str) -> Result<AccessGrant> {
        credential.validate()?;
        self.record(MockCall::Authorise(credential.clone(), code.to_string()));
        if code != self.request_token.code {
            return Err(PocketError::Status {
                endpoint: Endpoint::Authorise,
                status: 403,
                message: Some("User rejected code.".to_string()),
                code: Some(158),
            });
        }
        Ok(self.grant.clone())
    }

    async fn retrieve(&self, request: &ItemRequest) -> Result<RetrieveResponse> {
        request.validate()?;
        self.record(MockCall::Retrieve(request.clone()));
        Ok(self.items.clone())
    }

    async fn modify(&self, request: &ModifyRequest) -> Result<ModifyResponse> {
        self.record(MockCall::Modify(request.clone()));
        Ok(self.modify_response.clone().unwrap_or_else(|| ModifyResponse {
            status: 1,
            action_results: vec![serde_json::Value::Bool(true); request.actions().len()],
            action_errors: None,
        }))
    }
}
