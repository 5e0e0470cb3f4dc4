use crate::filetype::FileType;
use std::io;
use std::os::unix::fs::MetadataExt as _;
use std::path::Path;

/**
A snapshot of one directory entry's inode attributes at lstat time.

Captured once per entry and never updated; everything the record formatter
emits comes out of this struct, so a record is a faithful picture of the
entry at the moment the walk saw it even if the filesystem mutates later.
*/
#[derive(Debug, Clone, Copy)]
pub struct Metadata {
    pub ino: u64,
    pub dev: u64,
    pub nlink: u64,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub blocks: u64,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
}

impl Metadata {
    /// Captures the entry behind `path` without following symlinks.
    ///
    /// # Errors
    /// Propagates the underlying lstat failure; callers treat that as
    /// "the entry does not exist for this walk".
    #[inline]
    pub fn lstat(path: &Path) -> io::Result<Self> {
        let meta = std::fs::symlink_metadata(path)?;
        Ok(Self {
            ino: meta.ino(),
            dev: meta.dev(),
            nlink: meta.nlink(),
            mode: meta.mode(),
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.size(),
            blocks: meta.blocks(),
            atime: meta.atime(),
            mtime: meta.mtime(),
            ctime: meta.ctime(),
        })
    }

    #[must_use]
    #[inline]
    pub const fn file_type(&self) -> FileType {
        FileType::from_mode(self.mode as libc::mode_t)
    }

    #[must_use]
    #[inline]
    pub const fn is_dir(&self) -> bool {
        self.file_type().is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_of_a_regular_file() {
        let dir = std::env::temp_dir().join("fsweep_meta_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("payload.bin");
        std::fs::write(&file, b"0123456789").unwrap();

        let meta = Metadata::lstat(&file).unwrap();
        assert_eq!(meta.size, 10);
        assert_eq!(meta.file_type(), FileType::RegularFile);
        assert!(!meta.is_dir());
        assert!(meta.ino != 0);
        assert!(meta.nlink >= 1);

        let dir_meta = Metadata::lstat(&dir).unwrap();
        assert!(dir_meta.is_dir());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn lstat_does_not_follow_symlinks() {
        let dir = std::env::temp_dir().join("fsweep_meta_symlink");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let target = dir.join("target.txt");
        std::fs::write(&target, b"abcdef").unwrap();
        let link = dir.join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let meta = Metadata::lstat(&link).unwrap();
        assert_eq!(meta.file_type(), FileType::Symlink);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
