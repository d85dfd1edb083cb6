use crate::config::endpoints::Endpoints;
use crate::domain::model::{Credential, Session};
use crate::utils::error::{PocketError, Result};
use crate::utils::validation::{validate_credential, validate_range, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SETTINGS_FILE: &str = "lint.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Settings {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PocketError::ConfigParse {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${POCKET_CONSUMER_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PocketError::ConfigParse {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable {} is not set", var_name);
                String::new()
            })
        });

        Ok(result.to_string())
    }

    pub fn credential(&self) -> Credential {
        Credential::new(self.consumer_key.trim())
    }

    /// Session for item-level commands. Fails when no access token has been
    /// pasted into the settings yet.
    pub fn session(&self) -> Result<Session> {
        let access_token = self.access_token.as_deref().unwrap_or_default();
        validate_credential("access_token", access_token)?;
        Ok(Session::new(self.consumer_key.trim(), access_token.trim()))
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        self.endpoints.validate()?;
        validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 600)?;
        validate_range(
            "http.connect_timeout_seconds",
            self.http.connect_timeout_seconds,
            1,
            120,
        )?;
        Ok(())
    }
}
