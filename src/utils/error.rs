use crate::domain::model::{ActionOutcome, Endpoint};
use std::time::Duration;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum PocketError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Settings parse error in {field}: {message}")]
    ConfigParse { field: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not reach Pocket ({endpoint}): {source}")]
    Network {
        endpoint: Endpoint,
        #[source]
        source: BoxError,
    },

    #[error("Request to {endpoint} timed out after {after:?}")]
    Timeout { endpoint: Endpoint, after: Duration },

    #[error("Request to {endpoint} was cancelled")]
    Cancelled { endpoint: Endpoint },

    #[error("Pocket returned HTTP {status} for {endpoint}{}", format_x_error(.message, .code))]
    Status {
        endpoint: Endpoint,
        status: u16,
        message: Option<String>,
        code: Option<u32>,
    },

    #[error("Could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed {endpoint} response: {message}")]
    Malformed { endpoint: Endpoint, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pocket rejected {} of {} action(s) (status {status})", failed_count(.outcomes), .outcomes.len())]
    Rejected {
        status: i32,
        outcomes: Vec<ActionOutcome>,
    },
}

fn format_x_error(message: &Option<String>, code: &Option<u32>) -> String {
    match (message, code) {
        (Some(m), Some(c)) => format!(": {} (X-Error-Code {})", m, c),
        (Some(m), None) => format!(": {}", m),
        (None, Some(c)) => format!(" (X-Error-Code {})", c),
        (None, None) => String::new(),
    }
}

fn failed_count(outcomes: &[ActionOutcome]) -> usize {
    outcomes.iter().filter(|o| !o.succeeded).count()
}

/// The four failure kinds callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigError,
    NetworkError,
    ProtocolError,
    RemoteRejection,
}

impl PocketError {
    pub fn config(message: impl Into<String>) -> Self {
        PocketError::Config {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        PocketError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PocketError::Config { .. }
            | PocketError::InvalidRequest { .. }
            | PocketError::ConfigParse { .. }
            | PocketError::Io(_) => ErrorKind::ConfigError,
            PocketError::Network { .. }
            | PocketError::Timeout { .. }
            | PocketError::Cancelled { .. } => ErrorKind::NetworkError,
            PocketError::Status { .. }
            | PocketError::Decode { .. }
            | PocketError::Malformed { .. }
            | PocketError::Serialization(_) => ErrorKind::ProtocolError,
            PocketError::Rejected { .. } => ErrorKind::RemoteRejection,
        }
    }

    /// Endpoint involved in the failure, when one was contacted.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            PocketError::Network { endpoint, .. }
            | PocketError::Timeout { endpoint, .. }
            | PocketError::Cancelled { endpoint }
            | PocketError::Status { endpoint, .. }
            | PocketError::Decode { endpoint, .. }
            | PocketError::Malformed { endpoint, .. } => Some(*endpoint),
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PocketError::Config { message } | PocketError::InvalidRequest { message } => {
                message.clone()
            }
            PocketError::ConfigParse { field, message } => {
                format!("The settings file could not be read ({}): {}", field, message)
            }
            PocketError::Io(e) => format!("Could not read the settings file: {}", e),
            PocketError::Network { source, .. } => {
                format!("Error communicating with Pocket: {}", source)
            }
            PocketError::Timeout { after, .. } => {
                format!("Pocket did not answer within {} seconds", after.as_secs())
            }
            PocketError::Cancelled { .. } => "The request to Pocket was cancelled".to_string(),
            PocketError::Status {
                status, message, ..
            } => match message {
                Some(m) => format!("Pocket refused the request ({}): {}", status, m),
                None => format!("Pocket refused the request with HTTP {}", status),
            },
            PocketError::Decode { endpoint, .. } | PocketError::Malformed { endpoint, .. } => {
                format!("Pocket sent an unexpected {} response", endpoint)
            }
            PocketError::Serialization(e) => format!("Could not build the request: {}", e),
            PocketError::Rejected { outcomes, .. } => {
                let failed: Vec<String> = outcomes
                    .iter()
                    .filter(|o| !o.succeeded)
                    .map(|o| format!("{} {}", o.action, o.item_id))
                    .collect();
                format!("Pocket did not apply: {}", failed.join(", "))
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::ConfigError => {
                "Check lint.toml: consumer_key (and access_token for item commands) must be set"
            }
            ErrorKind::NetworkError => "Check your network connection and try again",
            ErrorKind::ProtocolError => match self {
                PocketError::Status { status: 401, .. } | PocketError::Status { status: 403, .. } => {
                    "Run `pocket-lint auth` again to obtain a fresh access token"
                }
                _ => "Pocket may have changed its API; re-run with --verbose for details",
            },
            ErrorKind::RemoteRejection => "Verify the item IDs exist in your Pocket list",
        }
    }
}

pub type Result<T> = std::result::Result<T, PocketError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn kinds_map_to_the_four_categories() {
        assert_eq!(PocketError::config("x").kind(), ErrorKind::ConfigError);
        assert_eq!(
            PocketError::Cancelled {
                endpoint: Endpoint::Modify
            }
            .kind(),
            ErrorKind::NetworkError
        );
        assert_eq!(
            PocketError::Malformed {
                endpoint: Endpoint::Modify,
                message: "x".into()
            }
            .kind(),
            ErrorKind::ProtocolError
        );
        assert_eq!(
            PocketError::Rejected {
                status: 0,
                outcomes: vec![]
            }
            .kind(),
            ErrorKind::RemoteRejection
        );
    }

    #[test]
    fn status_display_includes_x_error() {
        let err = PocketError::Status {
            endpoint: Endpoint::Authenticate,
            status: 403,
            message: Some("Invalid consumer key.".into()),
            code: Some(152),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("Invalid consumer key."));
        assert!(msg.contains("152"));
        assert!(msg.contains("authenticate"));
    }

    #[test]
    fn network_error_chains_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = PocketError::Network {
            endpoint: Endpoint::Retrieve,
            source: Box::new(io),
        };
        assert!(err.source().is_some());
        assert_eq!(err.endpoint(), Some(Endpoint::Retrieve));
        assert!(err.user_friendly_message().contains("refused"));
    }

    #[test]
    fn rejected_reports_failed_actions() {
        let err = PocketError::Rejected {
            status: 1,
            outcomes: vec![
                ActionOutcome {
                    action: "archive".into(),
                    item_id: 1,
                    succeeded: true,
                    error: None,
                },
                ActionOutcome {
                    action: "favorite".into(),
                    item_id: 2,
                    succeeded: false,
                    error: None,
                },
            ],
        };
        assert!(err.to_string().contains("1 of 2"));
        assert_eq!(err.user_friendly_message(), "Pocket did not apply: favorite 2");
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PocketError>();
    }
}
