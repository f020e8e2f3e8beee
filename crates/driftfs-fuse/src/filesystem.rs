//! Core FUSE filesystem implementation.
//!
//! Implements the `fuser::Filesystem` trait on top of the path-addressed
//! remote engine. Kernel callbacks are thin shells around internal helpers
//! returning `Result`; the shells only translate errors to errnos and feed
//! the reply objects.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::os::raw::c_int;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use fuser::{
    FileType as FuserFileType, Filesystem, KernelConfig, ReplyAttr, ReplyData, ReplyDirectory,
    ReplyEmpty, ReplyEntry, ReplyOpen, ReplyStatfs, ReplyXattr, Request, TimeOrNow,
};
use tracing::debug;

use crate::attr::{item_kind_to_fuser_type, item_to_attr};
use crate::error::{FuseError, Result};
use crate::inode::{InodeId, InodeTable, ROOT_INODE};
use driftfs_engine::{fs::child_path, DriveItem, EngineError, RemoteFs};

/// The one extended attribute exposed: the remote content digest.
pub const XATTR_HASH: &str = "user.hash";

const BLOCK_SIZE: u64 = 4096;
const NAME_MAX: u32 = 1024;

#[derive(Debug, Clone)]
pub struct DriftConfig {
    pub uid: u32,
    pub gid: u32,
    pub attr_timeout: Duration,
    pub entry_timeout: Duration,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            uid: 0,
            gid: 0,
            attr_timeout: Duration::from_secs(1),
            entry_timeout: Duration::from_secs(1),
        }
    }
}

#[derive(Debug)]
struct OpenHandle {
    ino: u64,
}

struct AdapterState {
    inodes: InodeTable,
    open_handles: HashMap<u64, OpenHandle>,
    next_fh: u64,
}

pub struct DriftFilesystem {
    config: DriftConfig,
    engine: Arc<RemoteFs>,
    state: Mutex<AdapterState>,
}

impl DriftFilesystem {
    pub fn new(config: DriftConfig, engine: Arc<RemoteFs>) -> Self {
        Self {
            config,
            engine,
            state: Mutex::new(AdapterState {
                inodes: InodeTable::new(),
                open_handles: HashMap::new(),
                next_fh: 1,
            }),
        }
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, AdapterState>> {
        self.state
            .lock()
            .map_err(|_| FuseError::Engine(EngineError::Poisoned))
    }

    fn path_of(&self, ino: InodeId) -> Result<String> {
        let state = self.lock()?;
        state
            .inodes
            .path_of(ino)
            .map(str::to_string)
            .ok_or(FuseError::NotFound {
                path: format!("inode {}", ino),
            })
    }

    /// Resolves an inode to its current remote item, treating the Unknown
    /// sentinel as a missing entry.
    fn resolve_ino(&self, ino: InodeId) -> Result<(String, DriveItem)> {
        let path = self.path_of(ino)?;
        let item = self.engine.resolve(&path)?;
        if item.is_unknown() {
            return Err(FuseError::NotFound { path });
        }
        Ok((path, item))
    }

    fn lookup_impl(&self, parent: InodeId, name: &str) -> Result<(InodeId, DriveItem)> {
        let parent_path = self.path_of(parent)?;
        let path = child_path(&parent_path, name);
        let item = self.engine.resolve(&path)?;
        if item.is_unknown() {
            return Err(FuseError::NotFound { path });
        }
        let ino = self.lock()?.inodes.ino_for(&path);
        Ok((ino, item))
    }

    /// The readdir listing without the `.`/`..` entries, each child already
    /// assigned an inode.
    fn readdir_impl(&self, ino: InodeId) -> Result<Vec<(InodeId, FuserFileType, String)>> {
        let (path, item) = self.resolve_ino(ino)?;
        if ino != ROOT_INODE && !item.is_folder() {
            return Err(FuseError::NotDirectory { path });
        }

        let children = self
            .engine
            .list_children(&path)?
            .ok_or(FuseError::NotFound { path: path.clone() })?;

        let mut state = self.lock()?;
        Ok(children
            .into_iter()
            .map(|child| {
                let child_ino = state.inodes.ino_for(&child_path(&path, &child.name));
                (child_ino, item_kind_to_fuser_type(child.kind), child.name)
            })
            .collect())
    }

    fn parent_ino(&self, path: &str) -> Result<InodeId> {
        let parent_path = match path.rfind('/') {
            Some(0) | None => "/".to_string(),
            Some(pos) => path[..pos].to_string(),
        };
        Ok(self.lock()?.inodes.ino_for(&parent_path))
    }

    fn unlink_impl(&self, parent: InodeId, name: &str) -> Result<()> {
        let parent_path = self.path_of(parent)?;
        let path = child_path(&parent_path, name);
        let item = self.engine.resolve(&path)?;
        if item.is_unknown() {
            return Err(FuseError::NotFound { path });
        }
        if item.is_folder() {
            return Err(FuseError::IsDirectory { path });
        }
        self.engine.delete(&item)?;
        self.lock()?.inodes.remove_path(&path);
        Ok(())
    }

    fn rmdir_impl(&self, parent: InodeId, name: &str) -> Result<()> {
        let parent_path = self.path_of(parent)?;
        let path = child_path(&parent_path, name);
        let item = self.engine.resolve(&path)?;
        if item.is_unknown() {
            return Err(FuseError::NotFound { path });
        }
        if !item.is_folder() {
            return Err(FuseError::NotDirectory { path });
        }
        match self.engine.list_children(&path)? {
            Some(children) if !children.is_empty() => {
                return Err(FuseError::NotEmpty { path });
            }
            _ => {}
        }
        self.engine.delete(&item)?;
        self.lock()?.inodes.remove_path(&path);
        Ok(())
    }

    fn truncate_impl(&self, ino: InodeId, size: u64) -> Result<DriveItem> {
        let (path, mut item) = self.resolve_ino(ino)?;
        if item.is_folder() {
            return Err(FuseError::IsDirectory { path });
        }
        self.engine.truncate(&item, size)?;
        item.size = size;
        Ok(item)
    }

    /// Filesystem-wide block figures from the remote quota.
    fn statfs_impl(&self) -> Result<(u64, u64)> {
        let drive = self.engine.drive()?;
        let blocks = drive.quota.total / BLOCK_SIZE;
        let free = drive.quota.remaining / BLOCK_SIZE;
        Ok((blocks, free))
    }

    /// Value of one extended attribute, or None when the entry carries it
    /// but the requested name is not exposed.
    fn xattr_impl(&self, ino: InodeId, name: &str) -> Result<Option<Vec<u8>>> {
        let (_, item) = self.resolve_ino(ino)?;
        if name != XATTR_HASH {
            return Ok(None);
        }
        Ok(item.sha1_hash.map(String::into_bytes))
    }

    /// The NUL-separated xattr name list for an entry.
    fn xattr_names(&self, ino: InodeId) -> Result<Vec<u8>> {
        let (_, item) = self.resolve_ino(ino)?;
        let mut names = Vec::new();
        if item.sha1_hash.is_some() {
            names.extend_from_slice(XATTR_HASH.as_bytes());
            names.push(0);
        }
        Ok(names)
    }

    fn open_impl(&self, ino: InodeId) -> Result<u64> {
        let (path, item) = self.resolve_ino(ino)?;
        if item.is_folder() {
            return Err(FuseError::IsDirectory { path });
        }
        let mut state = self.lock()?;
        let fh = state.next_fh;
        state.next_fh += 1;
        state.open_handles.insert(fh, OpenHandle { ino });
        Ok(fh)
    }

    fn read_impl(&self, ino: InodeId, offset: u64, size: u32) -> Result<Vec<u8>> {
        let (path, item) = self.resolve_ino(ino)?;
        if item.is_folder() {
            return Err(FuseError::IsDirectory { path });
        }
        let mut buf = vec![0u8; size as usize];
        let n = self.engine.read(&item, &mut buf, offset)?;
        buf.truncate(n);
        Ok(buf)
    }
}

impl Filesystem for DriftFilesystem {
    fn init(
        &mut self,
        _req: &Request<'_>,
        _config: &mut KernelConfig,
    ) -> std::result::Result<(), c_int> {
        debug!("driftfs init");
        Ok(())
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let name_str = name.to_string_lossy();
        debug!("lookup parent={} name={}", parent, name_str);

        match self.lookup_impl(parent, &name_str) {
            Ok((ino, item)) => {
                let attr = item_to_attr(&item, ino, self.config.uid, self.config.gid);
                reply.entry(&self.config.entry_timeout, &attr, 0);
            }
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        debug!("getattr ino={}", ino);

        match self.resolve_ino(ino) {
            Ok((_, item)) => {
                let attr = item_to_attr(&item, ino, self.config.uid, self.config.gid);
                reply.attr(&self.config.attr_timeout, &attr);
            }
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn setattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        size: Option<u64>,
        _atime: Option<TimeOrNow>,
        _mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        debug!("setattr ino={} size={:?}", ino, size);

        let result = match size {
            // Only size changes reach the remote; ownership and mode are fixed.
            Some(new_size) => self.truncate_impl(ino, new_size),
            None => self.resolve_ino(ino).map(|(_, item)| item),
        };

        match result {
            Ok(item) => {
                let attr = item_to_attr(&item, ino, self.config.uid, self.config.gid);
                reply.attr(&self.config.attr_timeout, &attr);
            }
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn unlink(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let name_str = name.to_string_lossy();
        debug!("unlink parent={} name={}", parent, name_str);

        match self.unlink_impl(parent, &name_str) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn rmdir(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let name_str = name.to_string_lossy();
        debug!("rmdir parent={} name={}", parent, name_str);

        match self.rmdir_impl(parent, &name_str) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        debug!("open ino={} flags={}", ino, flags);

        match self.open_impl(ino) {
            Ok(fh) => reply.opened(fh, 0),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        debug!("read ino={} offset={} size={}", ino, offset, size);

        if offset < 0 {
            reply.error(libc::EINVAL);
            return;
        }

        match self.read_impl(ino, offset as u64, size) {
            Ok(data) => reply.data(&data),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn release(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        debug!("release fh={}", fh);

        match self.lock() {
            Ok(mut state) => {
                state.open_handles.remove(&fh);
                reply.ok();
            }
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        debug!("readdir ino={} offset={}", ino, offset);

        let path = match self.path_of(ino) {
            Ok(p) => p,
            Err(e) => {
                reply.error(e.to_errno());
                return;
            }
        };

        let entries = match self.readdir_impl(ino) {
            Ok(entries) => entries,
            Err(e) => {
                reply.error(e.to_errno());
                return;
            }
        };

        let parent = match self.parent_ino(&path) {
            Ok(p) => p,
            Err(e) => {
                reply.error(e.to_errno());
                return;
            }
        };

        let mut off = offset;

        if offset == 0 {
            if reply.add(ino, 1, FuserFileType::Directory, ".") {
                return;
            }
            off = 1;
        }

        if offset <= 1 {
            if reply.add(parent, 2, FuserFileType::Directory, "..") {
                return;
            }
            off = 2;
        }

        for (i, (child_ino, ftype, name)) in entries.iter().enumerate() {
            // Children occupy offsets 3.. after the two dot entries.
            let child_off = i as i64 + 2;
            if child_off < off {
                continue;
            }
            if reply.add(*child_ino, child_off + 1, *ftype, name) {
                return;
            }
        }

        reply.ok();
    }

    fn statfs(&mut self, _req: &Request<'_>, _ino: u64, reply: ReplyStatfs) {
        debug!("statfs");

        match self.statfs_impl() {
            Ok((blocks, free)) => reply.statfs(
                blocks,
                free,
                free,
                0,
                0,
                BLOCK_SIZE as u32,
                NAME_MAX,
                BLOCK_SIZE as u32,
            ),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn getxattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        name: &OsStr,
        size: u32,
        reply: ReplyXattr,
    ) {
        let name_str = name.to_string_lossy();
        debug!("getxattr ino={} name={}", ino, name_str);

        match self.xattr_impl(ino, &name_str) {
            Ok(Some(value)) => {
                if size == 0 {
                    reply.size(value.len() as u32);
                } else if (size as usize) < value.len() {
                    reply.error(libc::ERANGE);
                } else {
                    reply.data(&value);
                }
            }
            Ok(None) => reply.error(libc::ENODATA),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn listxattr(&mut self, _req: &Request<'_>, ino: u64, size: u32, reply: ReplyXattr) {
        debug!("listxattr ino={}", ino);

        match self.xattr_names(ino) {
            Ok(names) => {
                if size == 0 {
                    reply.size(names.len() as u32);
                } else if (size as usize) < names.len() {
                    reply.error(libc::ERANGE);
                } else {
                    reply.data(&names);
                }
            }
            Err(e) => reply.error(e.to_errno()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftfs_client::transport::TransportError;
    use driftfs_client::{
        ClientConfig, HttpRequest, HttpResponse, ProtocolClient, TokenStore, Transport, API_BASE,
    };
    use tempfile::TempDir;

    struct RouteTransport {
        routes: HashMap<String, HttpResponse>,
    }

    impl Transport for RouteTransport {
        fn execute(
            &self,
            request: &HttpRequest,
        ) -> std::result::Result<HttpResponse, TransportError> {
            Ok(self
                .routes
                .get(&request.url)
                .cloned()
                .unwrap_or_else(|| HttpResponse::new(404, b"no route".to_vec())))
        }
    }

    const TOKEN_BODY: &str = r#"{
        "token_type": "Bearer",
        "access_token": "at-1",
        "refresh_token": "rt-1"
    }"#;

    fn client_config() -> ClientConfig {
        ClientConfig {
            authority_url: "https://login.example.com".to_string(),
            auth_endpoint: "/oauth2/authorize".to_string(),
            token_endpoint: "/oauth2/token".to_string(),
            client_id: "client-123".to_string(),
            redirect_uri: "https://localhost/redirect".to_string(),
            authorization_code: "code-1".to_string(),
        }
    }

    fn json_route(resource: &str, body: &str) -> (String, HttpResponse) {
        (
            format!("{}{}", API_BASE, resource),
            HttpResponse::new(200, body.as_bytes().to_vec()),
        )
    }

    fn tree_routes() -> Vec<(String, HttpResponse)> {
        let root_children = r#"{"value": [
            {"id": "fdocs", "name": "docs", "folder": {"childCount": 1}},
            {"id": "fa", "name": "a.txt", "size": 100,
             "file": {"hashes": {"sha1Hash": "CAFEBABE"}}}
        ]}"#;
        vec![
            json_route("/me/drive/root", r#"{"id": "root1", "name": "root", "folder": {}}"#),
            json_route("/me/drive/items/root1/children", root_children),
            json_route("/me/drive/root/children", root_children),
            json_route(
                "/me/drive/items/fdocs/children",
                r#"{"value": [{"id": "fb", "name": "b.txt", "size": 40, "file": {}}]}"#,
            ),
        ]
    }

    fn filesystem_with(dir: &TempDir, routes: Vec<(String, HttpResponse)>) -> DriftFilesystem {
        let store = TokenStore::new(dir.path());
        store.save_raw(TOKEN_BODY.as_bytes()).unwrap();
        let transport = RouteTransport {
            routes: routes.into_iter().collect(),
        };
        let client = ProtocolClient::new(client_config(), store, Box::new(transport)).unwrap();
        DriftFilesystem::new(DriftConfig::default(), Arc::new(RemoteFs::new(client)))
    }

    #[test]
    fn test_lookup_known_child() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let (ino, item) = fs.lookup_impl(ROOT_INODE, "a.txt").unwrap();
        assert!(ino > ROOT_INODE);
        assert_eq!(item.size, 100);
        assert!(item.is_file());
    }

    #[test]
    fn test_lookup_missing_child_is_not_found() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let err = fs.lookup_impl(ROOT_INODE, "zzz").unwrap_err();
        assert_eq!(err.to_errno(), libc::ENOENT);
    }

    #[test]
    fn test_lookup_assigns_stable_inodes() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let (first, _) = fs.lookup_impl(ROOT_INODE, "docs").unwrap();
        let (second, _) = fs.lookup_impl(ROOT_INODE, "docs").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_readdir_of_root() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let entries = fs.readdir_impl(ROOT_INODE).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].2, "docs");
        assert_eq!(entries[0].1, FuserFileType::Directory);
        assert_eq!(entries[1].2, "a.txt");
        assert_eq!(entries[1].1, FuserFileType::RegularFile);
    }

    #[test]
    fn test_readdir_of_subdirectory() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let (docs_ino, _) = fs.lookup_impl(ROOT_INODE, "docs").unwrap();
        let entries = fs.readdir_impl(docs_ino).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].2, "b.txt");
    }

    #[test]
    fn test_readdir_of_file_is_not_directory() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let (file_ino, _) = fs.lookup_impl(ROOT_INODE, "a.txt").unwrap();
        let err = fs.readdir_impl(file_ino).unwrap_err();
        assert_eq!(err.to_errno(), libc::ENOTDIR);
    }

    #[test]
    fn test_open_folder_is_a_directory_error() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let (docs_ino, _) = fs.lookup_impl(ROOT_INODE, "docs").unwrap();
        let err = fs.open_impl(docs_ino).unwrap_err();
        assert_eq!(err.to_errno(), libc::EISDIR);
    }

    #[test]
    fn test_open_and_release_handles() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let (file_ino, _) = fs.lookup_impl(ROOT_INODE, "a.txt").unwrap();
        let fh1 = fs.open_impl(file_ino).unwrap();
        let fh2 = fs.open_impl(file_ino).unwrap();
        assert_ne!(fh1, fh2);
        assert_eq!(fs.lock().unwrap().open_handles.len(), 2);
    }

    #[test]
    fn test_read_returns_clamped_content() {
        let dir = TempDir::new().unwrap();
        let mut routes = tree_routes();
        routes.push((
            format!("{}/me/drive/items/fa/content", API_BASE),
            HttpResponse::new(206, vec![9u8; 40]),
        ));
        let fs = filesystem_with(&dir, routes);

        let (file_ino, _) = fs.lookup_impl(ROOT_INODE, "a.txt").unwrap();
        let data = fs.read_impl(file_ino, 60, 4096).unwrap();
        assert_eq!(data.len(), 40);
        assert!(data.iter().all(|&b| b == 9));
    }

    #[test]
    fn test_read_past_eof_is_empty() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let (file_ino, _) = fs.lookup_impl(ROOT_INODE, "a.txt").unwrap();
        let data = fs.read_impl(file_ino, 500, 4096).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_unlink_file_removes_mapping() {
        let dir = TempDir::new().unwrap();
        let mut routes = tree_routes();
        routes.push((
            format!("{}/me/drive/items/fa", API_BASE),
            HttpResponse::new(204, Vec::new()),
        ));
        let fs = filesystem_with(&dir, routes);

        let (file_ino, _) = fs.lookup_impl(ROOT_INODE, "a.txt").unwrap();
        fs.unlink_impl(ROOT_INODE, "a.txt").unwrap();
        assert!(fs.lock().unwrap().inodes.path_of(file_ino).is_none());
    }

    #[test]
    fn test_unlink_folder_is_a_directory_error() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let err = fs.unlink_impl(ROOT_INODE, "docs").unwrap_err();
        assert_eq!(err.to_errno(), libc::EISDIR);
    }

    #[test]
    fn test_rmdir_refuses_non_empty_directory() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let err = fs.rmdir_impl(ROOT_INODE, "docs").unwrap_err();
        assert_eq!(err.to_errno(), libc::ENOTEMPTY);
    }

    #[test]
    fn test_rmdir_of_file_is_not_directory() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let err = fs.rmdir_impl(ROOT_INODE, "a.txt").unwrap_err();
        assert_eq!(err.to_errno(), libc::ENOTDIR);
    }

    #[test]
    fn test_rmdir_empty_directory_succeeds() {
        let dir = TempDir::new().unwrap();
        let mut routes = tree_routes();
        // Make docs empty and deletable.
        routes.retain(|(url, _)| !url.ends_with("/me/drive/items/fdocs/children"));
        routes.push(json_route("/me/drive/items/fdocs/children", r#"{"value": []}"#));
        routes.push((
            format!("{}/me/drive/items/fdocs", API_BASE),
            HttpResponse::new(204, Vec::new()),
        ));
        let fs = filesystem_with(&dir, routes);

        fs.rmdir_impl(ROOT_INODE, "docs").unwrap();
    }

    #[test]
    fn test_truncate_to_zero() {
        let dir = TempDir::new().unwrap();
        let mut routes = tree_routes();
        routes.push((
            format!("{}/me/drive/items/fa/content", API_BASE),
            HttpResponse::new(200, Vec::new()),
        ));
        let fs = filesystem_with(&dir, routes);

        let (file_ino, _) = fs.lookup_impl(ROOT_INODE, "a.txt").unwrap();
        let item = fs.truncate_impl(file_ino, 0).unwrap();
        assert_eq!(item.size, 0);
    }

    #[test]
    fn test_truncate_to_nonzero_is_invalid() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let (file_ino, _) = fs.lookup_impl(ROOT_INODE, "a.txt").unwrap();
        let err = fs.truncate_impl(file_ino, 50).unwrap_err();
        assert_eq!(err.to_errno(), libc::EINVAL);
    }

    #[test]
    fn test_statfs_reflects_quota() {
        let dir = TempDir::new().unwrap();
        let mut routes = tree_routes();
        routes.push(json_route(
            "/me/drive",
            r#"{"id": "d1", "driveType": "personal",
                "quota": {"total": 40960, "used": 8192, "remaining": 32768}}"#,
        ));
        let fs = filesystem_with(&dir, routes);

        let (blocks, free) = fs.statfs_impl().unwrap();
        assert_eq!(blocks, 10);
        assert_eq!(free, 8);
    }

    #[test]
    fn test_xattr_hash_on_file() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let (file_ino, _) = fs.lookup_impl(ROOT_INODE, "a.txt").unwrap();
        let value = fs.xattr_impl(file_ino, XATTR_HASH).unwrap().unwrap();
        assert_eq!(value, b"CAFEBABE");

        let names = fs.xattr_names(file_ino).unwrap();
        assert_eq!(names, b"user.hash\0");
    }

    #[test]
    fn test_xattr_absent_on_folder() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let (docs_ino, _) = fs.lookup_impl(ROOT_INODE, "docs").unwrap();
        assert!(fs.xattr_impl(docs_ino, XATTR_HASH).unwrap().is_none());
        assert!(fs.xattr_names(docs_ino).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_xattr_name_has_no_value() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let (file_ino, _) = fs.lookup_impl(ROOT_INODE, "a.txt").unwrap();
        assert!(fs.xattr_impl(file_ino, "user.other").unwrap().is_none());
    }

    #[test]
    fn test_parent_ino_of_nested_path() {
        let dir = TempDir::new().unwrap();
        let fs = filesystem_with(&dir, tree_routes());

        let (docs_ino, _) = fs.lookup_impl(ROOT_INODE, "docs").unwrap();
        assert_eq!(fs.parent_ino("/docs/b.txt").unwrap(), docs_ino);
        assert_eq!(fs.parent_ino("/docs").unwrap(), ROOT_INODE);
        assert_eq!(fs.parent_ino("/").unwrap(), ROOT_INODE);
    }

    #[test]
    fn test_default_config() {
        let config = DriftConfig::default();
        assert_eq!(config.attr_timeout, Duration::from_secs(1));
        assert_eq!(config.entry_timeout, Duration::from_secs(1));
    }
}
