//! Filesystem-backed store operations

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::name::{JsonFileName, JSON_EXTENSION};
use crate::error::StoreError;

/// One entry of the file listing
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    /// ISO-8601 UTC timestamp with milliseconds
    pub modified: String,
    /// Relative path the file can be fetched from
    pub path: String,
}

/// Upload directory handle
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &JsonFileName) -> PathBuf {
        self.root.join(name.as_str())
    }

    /// Create the upload directory if it does not exist yet
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// List every regular `.json` file in the directory
    pub async fn list(&self) -> Result<Vec<FileEntry>, StoreError> {
        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::io("read upload directory", e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StoreError::io("read upload directory", e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.ends_with(JSON_EXTENSION) {
                continue;
            }
            // Follows symlinks; an entry removed since read_dir is skipped
            let metadata = match fs::metadata(entry.path()).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::io("stat file", e)),
            };
            if !metadata.is_file() {
                continue;
            }

            let modified = metadata
                .modified()
                .map(format_timestamp)
                .unwrap_or_default();
            entries.push(FileEntry {
                path: format!("/files/{name}"),
                name,
                size: metadata.len(),
                modified,
            });
        }

        Ok(entries)
    }

    /// Names of all listed files; an unreadable directory yields an empty list
    pub async fn available_names(&self) -> Vec<String> {
        self.list()
            .await
            .map(|entries| entries.into_iter().map(|e| e.name).collect())
            .unwrap_or_default()
    }

    /// Read and parse a stored document
    pub async fn read_json(&self, name: &JsonFileName) -> Result<Value, StoreError> {
        let content = match fs::read(self.path_of(name)).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => return Err(StoreError::io("read file", e)),
        };
        // Bytes that are not UTF-8 surface as a parse error
        Ok(serde_json::from_slice(&content)?)
    }

    /// Write (or overwrite) a document, returning its size on disk
    pub async fn write(&self, name: &JsonFileName, content: &[u8]) -> Result<u64, StoreError> {
        let path = self.path_of(name);
        fs::write(&path, content)
            .await
            .map_err(|e| StoreError::io("write file", e))?;
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| StoreError::io("stat file", e))?;
        Ok(metadata.len())
    }

    pub async fn remove(&self, name: &JsonFileName) -> Result<(), StoreError> {
        match fs::remove_file(self.path_of(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(name.to_string())),
            Err(e) => Err(StoreError::io("remove file", e)),
        }
    }
}

/// Format a timestamp the way browsers print `Date.toISOString()`
pub fn format_timestamp(time: impl Into<DateTime<Utc>>) -> String {
    time.into().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::validate_json_name;

    fn name(raw: &str) -> JsonFileName {
        validate_json_name(raw).unwrap()
    }

    #[tokio::test]
    async fn test_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let size = store.write(&name("a.json"), br#"{"x":1}"#).await.unwrap();
        assert_eq!(size, 7);
        assert!(dir.path().join("a.json").exists());
        assert_eq!(
            store.read_json(&name("a.json")).await.unwrap(),
            serde_json::json!({"x": 1})
        );

        store.remove(&name("a.json")).await.unwrap();
        assert!(!dir.path().join("a.json").exists());
        assert!(matches!(
            store.read_json(&name("a.json")).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.remove(&name("a.json")).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_json_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();

        let store = FileStore::new(dir.path());
        let entries = store.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.json");
        assert_eq!(entries[0].size, 2);
        assert_eq!(entries[0].path, "/files/a.json");
        assert!(entries[0].modified.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bin.json"), [0xFF, 0xFE, b'{', b'}']).unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.read_json(&name("bin.json")).await,
            Err(StoreError::InvalidJson(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_skips_vanished_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.json"), dir.path().join("link.json"))
            .unwrap();

        let store = FileStore::new(dir.path());
        let entries = store.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.json");
        assert_eq!(store.available_names().await, vec!["a.json".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("gone"));
        assert!(matches!(store.list().await, Err(StoreError::Io { .. })));
        assert!(store.available_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.read_json(&name("bad.json")).await,
            Err(StoreError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_format_timestamp() {
        let time = DateTime::parse_from_rfc3339("2024-05-01T08:09:10.123Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(time), "2024-05-01T08:09:10.123Z");
    }
}
