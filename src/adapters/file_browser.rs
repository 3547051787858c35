//! File browser over the day-file store.
//!
//! List, read, and delete files under the storage root so the logs can
//! be pulled or pruned without popping the card. Paths are relative to
//! the root and may not escape it.

use std::path::{Component, Path, PathBuf};

use log::info;

use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

pub struct FileBrowser {
    root: PathBuf,
}

impl FileBrowser {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, rel: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(rel);
        // Only plain names below the root; no "..", no absolute paths.
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(StorageError::NotFound);
        }
        Ok(self.root.join(rel))
    }

    /// Entries in a directory, sorted by name.
    pub fn list(&self, dir: &str) -> Result<Vec<FileEntry>, StorageError> {
        let path = self.resolve(dir)?;
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&path).map_err(|_| StorageError::NotFound)? {
            let entry = entry.map_err(|_| StorageError::NotFound)?;
            let meta = entry.metadata().map_err(|_| StorageError::NotFound)?;
            entries.push(FileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: meta.is_dir(),
                size: meta.len(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(name)?;
        std::fs::read(&path).map_err(|_| StorageError::NotFound)
    }

    pub fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        std::fs::remove_file(&path).map_err(|_| StorageError::NotFound)?;
        info!("Deleted {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("leakwatch-fb-{}-{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn lists_sorted_entries() {
        let dir = scratch_dir("list");
        std::fs::write(dir.join("Volts 2024-03-07.txt"), b"v").unwrap();
        std::fs::write(dir.join("Amps 2024-03-07.txt"), b"aa").unwrap();

        let fb = FileBrowser::new(&dir);
        let entries = fb.list(".").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Amps 2024-03-07.txt");
        assert_eq!(entries[0].size, 2);
        assert!(!entries[0].is_dir);
        assert_eq!(entries[1].name, "Volts 2024-03-07.txt");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_and_delete() {
        let dir = scratch_dir("rd");
        std::fs::write(dir.join("a.txt"), b"hello").unwrap();

        let fb = FileBrowser::new(&dir);
        assert_eq!(fb.read("a.txt").unwrap(), b"hello");
        fb.delete("a.txt").unwrap();
        assert_eq!(fb.read("a.txt"), Err(StorageError::NotFound));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_escaping_paths() {
        let dir = scratch_dir("escape");
        let fb = FileBrowser::new(&dir);
        assert_eq!(fb.read("../secret"), Err(StorageError::NotFound));
        assert_eq!(fb.read("/etc/hostname"), Err(StorageError::NotFound));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_is_not_found() {
        let dir = scratch_dir("nodir");
        let fb = FileBrowser::new(&dir);
        assert_eq!(fb.list("nope"), Err(StorageError::NotFound));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
