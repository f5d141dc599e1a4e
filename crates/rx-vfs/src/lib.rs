//! File system capabilities for retrox
//!
//! The front-end never touches paths directly: games, root folders and
//! dependency files travel as opaque handles handed out by a storage or
//! picker capability.

pub mod handles;
pub mod picker;
pub mod storage;

pub use handles::{extension_of, DirectoryHandle, FileHandle};
pub use picker::{FilePicker, PresetPicker};
pub use storage::{HostStorage, Storage};
