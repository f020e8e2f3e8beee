use std::collections::HashMap;

pub type InodeId = u64;
pub const ROOT_INODE: InodeId = 1;

/// Bidirectional inode-number/path table.
///
/// The kernel addresses entries by inode number while the engine is
/// path-addressed; this table is the only place the two meet. Numbers are
/// allocated on first sight of a path and never reused within a mount.
pub struct InodeTable {
    by_ino: HashMap<InodeId, String>,
    by_path: HashMap<String, InodeId>,
    next_ino: InodeId,
}

impl InodeTable {
    pub fn new() -> Self {
        let mut table = InodeTable {
            by_ino: HashMap::new(),
            by_path: HashMap::new(),
            next_ino: ROOT_INODE + 1,
        };
        table.by_ino.insert(ROOT_INODE, "/".to_string());
        table.by_path.insert("/".to_string(), ROOT_INODE);
        table
    }

    pub fn path_of(&self, ino: InodeId) -> Option<&str> {
        self.by_ino.get(&ino).map(String::as_str)
    }

    /// Returns the inode for a path, allocating one if the path is new.
    pub fn ino_for(&mut self, path: &str) -> InodeId {
        if let Some(&ino) = self.by_path.get(path) {
            return ino;
        }
        let ino = self.next_ino;
        self.next_ino += 1;
        self.by_ino.insert(ino, path.to_string());
        self.by_path.insert(path.to_string(), ino);
        ino
    }

    pub fn get(&self, path: &str) -> Option<InodeId> {
        self.by_path.get(path).copied()
    }

    /// Drops the mapping for a path, e.g. after unlink. The root mapping
    /// is never removed.
    pub fn remove_path(&mut self, path: &str) {
        if path == "/" {
            return;
        }
        if let Some(ino) = self.by_path.remove(path) {
            self.by_ino.remove(&ino);
        }
    }

    pub fn len(&self) -> usize {
        self.by_ino.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ino.is_empty()
    }
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}
