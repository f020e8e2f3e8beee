use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the persisted token record inside the config directory.
pub const TOKEN_FILE: &str = "token.json";

/// Access/refresh token pair as returned by the token endpoint.
///
/// The durable copy lives on disk; the in-memory copy is authoritative only
/// for the duration of a request and is reloaded wholesale after every
/// exchange or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenState {
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub ext_expires_in: u64,
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenState {
    /// Value for the `Authorization` request header.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

/// Durable store for the token record.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(dir: &Path) -> Self {
        TokenStore {
            path: dir.join(TOKEN_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored token record, or `None` when no record exists yet.
    pub fn load(&self) -> Result<Option<TokenState>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => {
                let state: TokenState = serde_json::from_slice(&bytes)?;
                Ok(Some(state))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persists a raw token-endpoint response body.
    ///
    /// The body is validated as a token record before it replaces the file,
    /// so a malformed response can never clobber a working token.
    pub fn save_raw(&self, body: &[u8]) -> Result<TokenState> {
        let state: TokenState = serde_json::from_slice(body)?;
        std::fs::write(&self.path, body)?;
        debug!("token store: persisted token record to {}", self.path.display());
        Ok(state)
    }
}
