use driftfs_client::ClientError;
use driftfs_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FuseError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("no such entry: {path}")]
    NotFound { path: String },

    #[error("not a directory: {path}")]
    NotDirectory { path: String },

    #[error("is a directory: {path}")]
    IsDirectory { path: String },

    #[error("directory not empty: {path}")]
    NotEmpty { path: String },

    #[error("invalid argument: {msg}")]
    InvalidArgument { msg: String },
}

pub type Result<T> = std::result::Result<T, FuseError>;

impl FuseError {
    /// Nearest POSIX error code. Nothing crossing the kernel boundary may
    /// carry anything but an errno; everything unclassified becomes EIO.
    pub fn to_errno(&self) -> i32 {
        use libc::*;
        match self {
            FuseError::Engine(e) => engine_errno(e),
            FuseError::NotFound { .. } => ENOENT,
            FuseError::NotDirectory { .. } => ENOTDIR,
            FuseError::IsDirectory { .. } => EISDIR,
            FuseError::NotEmpty { .. } => ENOTEMPTY,
            FuseError::InvalidArgument { .. } => EINVAL,
        }
    }
}

fn engine_errno(e: &EngineError) -> i32 {
    use libc::*;
    match e {
        EngineError::UnsupportedTruncate => EINVAL,
        EngineError::Client(ClientError::Remote { status: 404, .. }) => ENOENT,
        _ => EIO,
    }
}
