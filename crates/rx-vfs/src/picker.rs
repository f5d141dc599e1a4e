//! File picker capability

use crate::handles::{DirectoryHandle, FileHandle};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::warn;

/// Lets the user choose a game file or a root folder.
///
/// `None` means the user cancelled the pick.
#[async_trait]
pub trait FilePicker: Send + Sync {
    /// Pick a file whose extension is one of `extensions`
    async fn pick_file(&self, extensions: &[String]) -> Option<FileHandle>;

    /// Pick a directory
    async fn pick_directory(&self) -> Option<DirectoryHandle>;
}

/// Picker that answers with paths fixed up front, e.g. from the command line.
///
/// A preset file whose extension is outside the requested filter is treated
/// like a cancelled pick, as a real dialog would never have offered it.
#[derive(Debug, Clone, Default)]
pub struct PresetPicker {
    file: Option<PathBuf>,
    directory: Option<PathBuf>,
}

impl PresetPicker {
    pub fn new(file: Option<PathBuf>, directory: Option<PathBuf>) -> Self {
        Self { file, directory }
    }
}

#[async_trait]
impl FilePicker for PresetPicker {
    async fn pick_file(&self, extensions: &[String]) -> Option<FileHandle> {
        let file = FileHandle::new(self.file.clone()?);
        let extension = file.extension()?;

        if extensions.iter().any(|e| e.eq_ignore_ascii_case(&extension)) {
            Some(file)
        } else {
            warn!("{} does not match the picker filter {:?}", file, extensions);
            None
        }
    }

    async fn pick_directory(&self) -> Option<DirectoryHandle> {
        self.directory.clone().map(DirectoryHandle::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_preset_file_matching_filter() {
        let picker = PresetPicker::new(Some("/roms/Sonic.MD".into()), None);
        let file = picker.pick_file(&exts(&[".md", ".zip"])).await.unwrap();
        assert_eq!(file.name(), "Sonic.MD");
    }

    #[tokio::test]
    async fn test_preset_file_outside_filter() {
        let picker = PresetPicker::new(Some("/roms/Sonic.md".into()), None);
        assert!(picker.pick_file(&exts(&[".sfc", ".smc"])).await.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_picks() {
        let picker = PresetPicker::default();
        assert!(picker.pick_file(&exts(&[".md"])).await.is_none());
        assert!(picker.pick_directory().await.is_none());
    }

    #[tokio::test]
    async fn test_preset_directory() {
        let picker = PresetPicker::new(None, Some("/roms/psx".into()));
        assert_eq!(picker.pick_directory().await.unwrap().full_path(), "/roms/psx");
    }
}
