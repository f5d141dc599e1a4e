//! Storage capability
//!
//! Storage hands out named directories under the front-end's data root and
//! looks files up inside them. Lookups report a missing entry as `Ok(None)`;
//! errors are reserved for entries that exist but cannot be used.

use crate::handles::{DirectoryHandle, FileHandle};
use async_trait::async_trait;
use rx_core::StorageError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory and file lookup scoped to the front-end's data root
#[async_trait]
pub trait Storage: Send + Sync {
    /// Look up a top-level directory
    async fn get_directory(&self, name: &str) -> Result<Option<DirectoryHandle>, StorageError>;

    /// Create a top-level directory, succeeding if it already exists
    async fn create_directory(&self, name: &str) -> Result<DirectoryHandle, StorageError>;

    /// Look up a file inside a directory
    async fn get_file(
        &self,
        directory: &DirectoryHandle,
        name: &str,
    ) -> Result<Option<FileHandle>, StorageError>;

    async fn get_or_create_directory(&self, name: &str) -> Result<DirectoryHandle, StorageError> {
        match self.get_directory(name).await? {
            Some(directory) => Ok(directory),
            None => self.create_directory(name).await,
        }
    }
}

/// Storage backed by a directory on the host file system
#[derive(Debug, Clone)]
pub struct HostStorage {
    root: PathBuf,
}

impl HostStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage over `root`, creating the directory if it is missing
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        match tokio::fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(StorageError::NotADirectory(root)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::create_dir_all(&root)
                    .await
                    .map_err(|source| StorageError::Io {
                        path: root.clone(),
                        source,
                    })?;
                debug!("Created storage root {}", root.display());
            }
            Err(source) => return Err(StorageError::Io { path: root, source }),
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entry names are single path components
    fn validate_name(name: &str) -> Result<(), StorageError> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\');
        if invalid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for HostStorage {
    async fn get_directory(&self, name: &str) -> Result<Option<DirectoryHandle>, StorageError> {
        Self::validate_name(name)?;
        let path = self.root.join(name);

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Ok(Some(DirectoryHandle::new(path))),
            Ok(_) => Err(StorageError::NotADirectory(path)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    async fn create_directory(&self, name: &str) -> Result<DirectoryHandle, StorageError> {
        Self::validate_name(name)?;
        let path = self.root.join(name);

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;

        debug!("Created storage directory {}", path.display());
        Ok(DirectoryHandle::new(path))
    }

    async fn get_file(
        &self,
        directory: &DirectoryHandle,
        name: &str,
    ) -> Result<Option<FileHandle>, StorageError> {
        Self::validate_name(name)?;
        let path = directory.path().join(name);

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(FileHandle::new(path))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}
