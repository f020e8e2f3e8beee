//! DriftFS FUSE subsystem.
//!
//! Bridges the kernel's inode-addressed callbacks to the path-addressed
//! remote engine and maps every engine failure to the nearest errno.

pub mod attr;
pub mod error;
pub mod filesystem;
pub mod inode;
pub mod mount;

pub use error::{FuseError, Result};
pub use filesystem::{DriftConfig, DriftFilesystem};
