//! SD-card storage adapter.
//!
//! Implements [`StoragePort`] over `std::fs` — ESP-IDF exposes the
//! mounted FAT volume through the VFS, so the identical code runs on the
//! target (rooted at `/sdcard`) and on the host (rooted anywhere, which
//! is what the tests use).
//!
//! Holds at most one open handle; `close` drops it, `reinit` additionally
//! remounts the card on the target.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::PathBuf;

use log::warn;

use crate::app::ports::StoragePort;
use crate::drivers::hw_init;
use crate::error::StorageError;

pub struct SdStorage {
    root: PathBuf,
    handle: Option<File>,
}

impl SdStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            handle: None,
        }
    }

    /// Adapter rooted at the card's VFS mount point.
    pub fn at_mount_point() -> Self {
        Self::new(hw_init::SD_MOUNT_POINT)
    }
}

impl StoragePort for SdStorage {
    fn open_append(&mut self, name: &str) -> Result<(), StorageError> {
        // A stale handle here means a previous call aborted; drop it.
        self.handle = None;
        let path = self.root.join(name);
        match OpenOptions::new().append(true).create(true).open(&path) {
            Ok(f) => {
                self.handle = Some(f);
                Ok(())
            }
            Err(e) => {
                warn!("open_append {:?} failed: {}", path, e);
                Err(StorageError::OpenFailed)
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        match self.handle.as_mut() {
            Some(f) => f.write_all(data).map_err(|e| {
                warn!("append failed: {}", e);
                StorageError::WriteFailed
            }),
            None => Err(StorageError::WriteFailed),
        }
    }

    fn close(&mut self) {
        self.handle = None;
    }

    fn reinit(&mut self) -> Result<(), StorageError> {
        self.handle = None;
        hw_init::remount_sd().map_err(|e| {
            warn!("SD remount failed: {}", e);
            StorageError::ReinitFailed
        })
    }

    fn file_size(&mut self, name: &str) -> Result<u64, StorageError> {
        std::fs::metadata(self.root.join(name))
            .map(|m| m.len())
            .map_err(|_| StorageError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("leakwatch-sd-{}-{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn append_creates_and_accumulates() {
        let dir = scratch_dir("append");
        let mut sd = SdStorage::new(&dir);

        sd.open_append("a.txt").unwrap();
        sd.write(b"one").unwrap();
        sd.close();

        sd.open_append("a.txt").unwrap();
        sd.write(b"two").unwrap();
        sd.close();

        assert_eq!(std::fs::read_to_string(dir.join("a.txt")).unwrap(), "onetwo");
        assert_eq!(sd.file_size("a.txt").unwrap(), 6);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_without_open_fails() {
        let dir = scratch_dir("noopen");
        let mut sd = SdStorage::new(&dir);
        assert_eq!(sd.write(b"x"), Err(StorageError::WriteFailed));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn size_of_missing_file_is_not_found() {
        let dir = scratch_dir("missing");
        let mut sd = SdStorage::new(&dir);
        assert_eq!(sd.file_size("ghost.txt"), Err(StorageError::NotFound));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn open_failure_when_root_is_gone() {
        let dir = scratch_dir("badroot");
        std::fs::remove_dir_all(&dir).unwrap();
        let mut sd = SdStorage::new(dir.join("nope"));
        assert_eq!(sd.open_append("a.txt"), Err(StorageError::OpenFailed));
    }
}
