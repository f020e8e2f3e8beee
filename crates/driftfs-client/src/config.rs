use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the client configuration inside the config directory.
pub const CONFIG_FILE: &str = "driftfs.toml";

/// Static OAuth2 client configuration.
///
/// Every field except `authorization_code` is required and must be
/// non-empty; `authorization_code` stays empty until the user has walked
/// through the interactive consent flow once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub authority_url: String,
    pub auth_endpoint: String,
    pub token_endpoint: String,
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub authorization_code: String,
}

impl ClientConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `driftfs.toml` from the given directory.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Self::from_file(&dir.join(CONFIG_FILE))
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("authority_url", &self.authority_url),
            ("auth_endpoint", &self.auth_endpoint),
            ("token_endpoint", &self.token_endpoint),
            ("client_id", &self.client_id),
            ("redirect_uri", &self.redirect_uri),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ClientError::Setup(format!(
                    "missing required config field: {}",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Token endpoint URL (authority + endpoint path).
    pub fn token_url(&self) -> String {
        format!("{}{}", self.authority_url, self.token_endpoint)
    }

    /// Authorization endpoint URL (authority + endpoint path).
    pub fn auth_url(&self) -> String {
        format!("{}{}", self.authority_url, self.auth_endpoint)
    }
}
