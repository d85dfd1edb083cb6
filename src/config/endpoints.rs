use crate::domain::model::{Endpoint, RequestToken};
use crate::utils::error::{PocketError, Result};
use crate::utils::validation::{validate_url, Validate};
use serde::{Deserialize, Serialize};
use url::Url;

pub const AUTHENTICATION_URL: &str = "https://getpocket.com/v3/oauth/request";
pub const AUTHORISATION_URL: &str = "https://getpocket.com/v3/oauth/authorize";
pub const RETRIEVE_URL: &str = "https://getpocket.com/v3/get";
pub const MODIFY_URL: &str = "https://getpocket.com/v3/send";

/// Page the user opens in a browser to approve a request token.
pub const USER_AUTHORISATION_URL: &str = "https://getpocket.com/auth/authorize";

/// Where Pocket sends the browser once the user has approved access.
pub const REDIRECT_URI: &str = "https://github.com/daveym/lint/blob/master/AUTHCOMPLETE.md";

/// URL table for the closed set of endpoints. Built once at startup and
/// shared read-only after that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub authenticate: String,
    pub authorise: String,
    pub retrieve: String,
    pub modify: String,
    pub user_authorisation: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            authenticate: AUTHENTICATION_URL.to_string(),
            authorise: AUTHORISATION_URL.to_string(),
            retrieve: RETRIEVE_URL.to_string(),
            modify: MODIFY_URL.to_string(),
            user_authorisation: USER_AUTHORISATION_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Same paths as production, rooted at `base_url`. Used to point the
    /// client at a local mock server.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            authenticate: format!("{}/v3/oauth/request", base),
            authorise: format!("{}/v3/oauth/authorize", base),
            retrieve: format!("{}/v3/get", base),
            modify: format!("{}/v3/send", base),
            user_authorisation: format!("{}/auth/authorize", base),
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Authenticate => &self.authenticate,
            Endpoint::Authorise => &self.authorise,
            Endpoint::Retrieve => &self.retrieve,
            Endpoint::Modify => &self.modify,
        }
    }

    pub fn redirect_uri(&self) -> &'static str {
        REDIRECT_URI
    }

    pub fn user_authorisation_url(&self, token: &RequestToken) -> Result<String> {
        let url = Url::parse_with_params(
            &self.user_authorisation,
            &[
                ("request_token", token.code.as_str()),
                ("redirect_uri", REDIRECT_URI),
            ],
        )
        .map_err(|e| PocketError::ConfigParse {
            field: "endpoints.user_authorisation".to_string(),
            message: e.to_string(),
        })?;
        Ok(url.into())
    }
}

impl Validate for Endpoints {
    fn validate(&self) -> Result<()> {
        for endpoint in Endpoint::ALL {
            validate_url(&format!("endpoints.{}", endpoint), self.url(endpoint))?;
        }
        validate_url("endpoints.user_authorisation", &self.user_authorisation)
    }
}
