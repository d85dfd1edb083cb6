//! Two-phase handshake: consumer key → request token → access grant.
//!
//! Between the two calls the user has to open the authorisation URL in a
//! browser and approve the request. That step happens outside this crate, so
//! nothing here checks that `exchange_code` follows `request_token`.

use crate::core::client::PocketClient;
use crate::domain::model::{AccessGrant, Credential, Endpoint, RequestToken};
use crate::domain::ports::Transport;
use crate::utils::error::{PocketError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::Serialize;

/// Field order is part of the wire contract.
#[derive(Debug, Serialize)]
struct AuthenticateRequest<'a> {
    consumer_key: &'a str,
    redirect_uri: &'a str,
}

#[derive(Debug, Serialize)]
struct AuthoriseRequest<'a> {
    consumer_key: &'a str,
    code: &'a str,
}

impl<T: Transport> PocketClient<T> {
    pub async fn request_token(&self, credential: &Credential) -> Result<RequestToken> {
        credential.validate()?;
        tracing::info!("🔑 Requesting a request token");

        let request = AuthenticateRequest {
            consumer_key: &credential.consumer_key,
            redirect_uri: crate::config::endpoints::REDIRECT_URI,
        };
        let token: RequestToken = self.call(Endpoint::Authenticate, &request).await?;

        if token.code.is_empty() {
            return Err(PocketError::Malformed {
                endpoint: Endpoint::Authenticate,
                message: "response contained an empty code".to_string(),
            });
        }
        tracing::debug!("🔑 Request token issued (state: {:?})", token.state);
        Ok(token)
    }

    pub async fn exchange_code(&self, credential: &Credential, code: &str) -> Result<AccessGrant> {
        credential.validate()?;
        validate_non_empty_string("code", code)?;
        tracing::info!("🔑 Exchanging request token for an access token");

        let request = AuthoriseRequest {
            consumer_key: &credential.consumer_key,
            code,
        };
        let grant: AccessGrant = self.call(Endpoint::Authorise, &request).await?;

        if grant.access_token.is_empty() {
            return Err(PocketError::Malformed {
                endpoint: Endpoint::Authorise,
                message: "response contained an empty access_token".to_string(),
            });
        }
        tracing::info!("🔑 Authorised as {}", grant.username);
        Ok(grant)
    }
}
