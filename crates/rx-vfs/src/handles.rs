//! Opaque file and directory handles

use std::fmt;
use std::path::{Path, PathBuf};

/// Extension of a file name, lower-cased and with its leading dot.
///
/// Everything from the last dot of the final component counts, so
/// `game.tar.gz` yields `.gz` and a name made only of an extension such
/// as `.zip` yields `.zip`. Names without a dot, or ending in one, yield
/// `None`.
pub fn extension_of(file_name: &str) -> Option<String> {
    let name = Path::new(file_name).file_name()?.to_string_lossy();
    let dot = name.rfind('.')?;
    let ext = &name[dot..];
    (ext.len() > 1).then(|| ext.to_lowercase())
}

/// A file handed out by a picker or storage capability
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    path: PathBuf,
}

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name including extension
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name())
    }

    /// Path of the containing directory as a string, empty for bare names
    pub fn parent_path(&self) -> String {
        self.path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A directory handed out by a picker or storage capability
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectoryHandle {
    path: PathBuf,
}

impl DirectoryHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Full path as a string
    pub fn full_path(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl fmt::Display for DirectoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
