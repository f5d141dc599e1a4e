//! Root folder requirements for multi-file games
//!
//! Disc images like `.cue` sheets reference sibling track files, so the
//! core needs access to a folder that contains the whole game.
//!
//! Containment is a plain string-prefix test on the file's parent path.
//! Symbolic links and mixed separator conventions are not resolved, and
//! `/roms/psx` counts as containing `/roms/psx2/game.cue`.

use crate::system::SystemDescriptor;
use rx_vfs::{extension_of, DirectoryHandle, FileHandle};

/// Decides whether a root folder is needed and whether a candidate fits
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderRequirementValidator;

impl FolderRequirementValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn is_folder_required(&self, system: &SystemDescriptor, file_name: &str) -> bool {
        extension_of(file_name)
            .map(|ext| system.multi_file_extensions().contains(&ext))
            .unwrap_or(false)
    }

    pub fn is_folder_valid(&self, file: &FileHandle, folder: &DirectoryHandle) -> bool {
        file.parent_path().starts_with(&folder.full_path())
    }
}
