//! DriftFS remote file-system engine.
//!
//! Translates hierarchical paths and POSIX-style operations into calls
//! against the flat, id-addressed remote object store, with a
//! bounded-staleness path-resolution cache in front of the network.

pub mod cache;
pub mod drive;
pub mod error;
pub mod fs;
pub mod item;
pub mod time;

pub use cache::{CacheStats, PathCache, PATH_TTL};
pub use drive::{DriveInfo, Owner, Quota};
pub use error::{EngineError, Result};
pub use fs::RemoteFs;
pub use item::{DriveItem, ItemKind};
pub use time::timestamp_of;
