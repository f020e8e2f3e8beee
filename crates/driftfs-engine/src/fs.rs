use crate::cache::PathCache;
use crate::drive::DriveInfo;
use crate::error::{EngineError, Result};
use crate::item::DriveItem;
use driftfs_client::ProtocolClient;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Joins a child name onto a parent path without doubling the separator
/// at the root.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() || parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }
}

fn is_root_path(path: &str) -> bool {
    path.split('/').all(str::is_empty)
}

struct FsState {
    client: ProtocolClient,
    cache: PathCache,
}

/// The remote file-system engine.
///
/// Sole owner of the translation between file-system semantics and the
/// remote object model. All entry points serialize through one mutex held
/// for the whole call, network round trip included; the dominant cost of a
/// single-user mount is network latency, not lock contention.
pub struct RemoteFs {
    state: Mutex<FsState>,
}

impl RemoteFs {
    pub fn new(client: ProtocolClient) -> Self {
        RemoteFs {
            state: Mutex::new(FsState {
                client,
                cache: PathCache::new(),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, FsState>> {
        self.state.lock().map_err(|_| EngineError::Poisoned)
    }

    /// Root-container metadata, single round trip, no caching.
    pub fn drive(&self) -> Result<DriveInfo> {
        let mut state = self.lock()?;
        let body = state.client.get("/me/drive")?;
        DriveInfo::from_json(&serde_json::from_slice(&body)?)
    }

    /// All drives visible to the user, single round trip, no caching.
    pub fn drives(&self) -> Result<Vec<DriveInfo>> {
        let mut state = self.lock()?;
        let body = state.client.get("/me/drives")?;
        DriveInfo::list_from_json(&serde_json::from_slice(&body)?)
    }

    /// The top-level container. Always a live call; root identity must not
    /// go stale across mounts.
    pub fn root(&self) -> Result<DriveItem> {
        let mut state = self.lock()?;
        Self::root_locked(&mut state)
    }

    /// Resolves a path to its item.
    ///
    /// A cached resolution within its TTL is returned directly. Otherwise
    /// the path is walked segment by segment from the root; the first child
    /// whose name matches a segment wins (duplicate sibling names are not
    /// detected). A segment with no match yields the Unknown sentinel
    /// immediately, with no further remote calls: an unresolved path is a
    /// negative result, not an error.
    pub fn resolve(&self, path: &str) -> Result<DriveItem> {
        let mut state = self.lock()?;
        Self::resolve_locked(&mut state, path)
    }

    /// Lists the children of the directory at `path`, or `None` when the
    /// path does not denote any remote item.
    ///
    /// Every returned child is inserted into the path cache under its full
    /// path, so an immediately following resolve of a just-listed entry is
    /// served without a walk.
    pub fn list_children(&self, path: &str) -> Result<Option<Vec<DriveItem>>> {
        let mut state = self.lock()?;

        let resource = if is_root_path(path) {
            Self::root_locked(&mut state)?;
            "/me/drive/root/children".to_string()
        } else {
            let parent = Self::resolve_locked(&mut state, path)?;
            if parent.is_unknown() {
                return Ok(None);
            }
            format!("/me/drive/items/{}/children", parent.id)
        };

        let body = state.client.get(&resource)?;
        let children = DriveItem::list_from_json(&serde_json::from_slice(&body)?)?;

        for child in &children {
            state.cache.insert(&child_path(path, &child.name), child.clone());
        }
        debug!("listed {} children of {}", children.len(), path);

        Ok(Some(children))
    }

    /// Reads file content into `buf` starting at `offset`; returns the
    /// number of bytes read.
    ///
    /// The range is clamped to the item size; a request starting at or past
    /// end-of-file returns zero bytes without touching the network. The
    /// remote may return fewer bytes than requested near end-of-file.
    pub fn read(&self, item: &DriveItem, buf: &mut [u8], offset: u64) -> Result<usize> {
        if offset >= item.size {
            return Ok(0);
        }
        let want = (buf.len() as u64).min(item.size - offset);
        if want == 0 {
            return Ok(0);
        }

        let mut state = self.lock()?;
        let data = state.client.get_range(
            &format!("/me/drive/items/{}/content", item.id),
            offset,
            want,
        )?;

        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    /// Deletes the remote item.
    pub fn delete(&self, item: &DriveItem) -> Result<()> {
        let mut state = self.lock()?;
        state.client.delete(&format!("/me/drive/items/{}", item.id))?;
        debug!("deleted item {} ({})", item.name, item.id);
        Ok(())
    }

    /// Truncates the file to zero length by replacing its content with an
    /// empty upload. Only zero-truncation is supported; any other offset
    /// fails rather than guessing at partial-truncate semantics.
    pub fn truncate(&self, item: &DriveItem, offset: u64) -> Result<()> {
        if offset != 0 {
            return Err(EngineError::UnsupportedTruncate);
        }
        let mut state = self.lock()?;
        state
            .client
            .put(&format!("/me/drive/items/{}/content", item.id), Vec::new())?;
        debug!("truncated item {} ({})", item.name, item.id);
        Ok(())
    }

    fn root_locked(state: &mut FsState) -> Result<DriveItem> {
        let body = state.client.get("/me/drive/root")?;
        DriveItem::from_json(&serde_json::from_slice(&body)?)
    }

    fn resolve_locked(state: &mut FsState, path: &str) -> Result<DriveItem> {
        if let Some(item) = state.cache.lookup(path) {
            return Ok(item);
        }

        let mut current = Self::root_locked(state)?;
        if is_root_path(path) {
            return Ok(current);
        }

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let body = state
                .client
                .get(&format!("/me/drive/items/{}/children", current.id))?;
            let children = DriveItem::list_from_json(&serde_json::from_slice(&body)?)?;

            match children.into_iter().find(|c| c.name == segment) {
                Some(child) => current = child,
                None => {
                    debug!("resolve {}: segment {:?} not found", path, segment);
                    return Ok(DriveItem::default());
                }
            }
        }

        state.cache.insert(path, current.clone());
        Ok(current)
    }
}
