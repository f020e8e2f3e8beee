use driftfs_client::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("remote call failed: {0}")]
    Client(#[from] ClientError),

    #[error("malformed remote response: {0}")]
    Malformed(String),

    #[error("malformed remote response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("truncate to a non-zero offset is not supported")]
    UnsupportedTruncate,

    #[error("engine lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// HTTP status of the underlying remote failure, when there is one.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            EngineError::Client(ClientError::Remote { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_status_extraction() {
        let err = EngineError::Client(ClientError::Remote {
            status: 404,
            body: "itemNotFound".to_string(),
        });
        assert_eq!(err.remote_status(), Some(404));

        assert_eq!(EngineError::UnsupportedTruncate.remote_status(), None);
        assert_eq!(
            EngineError::Malformed("size".to_string()).remote_status(),
            None
        );
    }

    #[test]
    fn test_display_messages_non_empty() {
        let errors = [
            EngineError::Malformed("bad size".into()),
            EngineError::UnsupportedTruncate,
            EngineError::Poisoned,
        ];
        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
