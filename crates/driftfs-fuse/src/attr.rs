use driftfs_engine::{DriveItem, ItemKind};
use std::time::{Duration, SystemTime};

/// Size reported for directories; the remote store has no meaningful
/// directory size.
pub const DIR_SIZE: u64 = 4096;

pub fn item_kind_to_fuser_type(kind: ItemKind) -> fuser::FileType {
    match kind {
        ItemKind::Folder => fuser::FileType::Directory,
        _ => fuser::FileType::RegularFile,
    }
}

fn epoch_time(secs: i64) -> SystemTime {
    if secs >= 0 {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs as u64)
    } else {
        SystemTime::UNIX_EPOCH
    }
}

fn blocks_for_size(size: u64) -> u64 {
    size.div_ceil(512)
}

/// Translates a resolved item into kernel-visible attributes.
///
/// Folders are 0o755 with nlink 2; files are 0o644 with their real size.
/// `ctime` is the remote creation time, `mtime` the remote modification
/// time, and `atime` mirrors `mtime` (the remote store tracks no access
/// time).
pub fn item_to_attr(item: &DriveItem, ino: u64, uid: u32, gid: u32) -> fuser::FileAttr {
    let (size, perm, nlink) = match item.kind {
        ItemKind::Folder => (DIR_SIZE, 0o755, 2),
        _ => (item.size, 0o644, 1),
    };
    let ctime = epoch_time(item.created_secs);
    let mtime = epoch_time(item.modified_secs);

    fuser::FileAttr {
        ino,
        size,
        blocks: blocks_for_size(size),
        atime: mtime,
        mtime,
        ctime,
        crtime: ctime,
        kind: item_kind_to_fuser_type(item.kind),
        perm,
        nlink,
        uid,
        gid,
        rdev: 0,
        blksize: 4096,
        flags: 0,
    }
}
