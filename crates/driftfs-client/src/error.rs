use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("setup error: {0}")]
    Setup(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("the server responded with {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// True for failures that require operator action before a retry can
    /// ever succeed (missing config, failed refresh).
    pub fn is_fatal_setup(&self) -> bool {
        matches!(self, ClientError::Setup(_) | ClientError::Auth(_))
    }
}
