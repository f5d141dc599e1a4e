//! Emulation core capability
//!
//! Every concrete core sits behind [`EmulationCore`]. The implementation is
//! chosen once, when the catalog is built from configuration.

pub mod null;

pub use null::NullCore;

use async_trait::async_trait;
use rx_core::{CoreConfig, CoreError, CoreKind};
use rx_input::{InjectedInput, PlayerSlot};
use rx_vfs::{DirectoryHandle, FileHandle};
use std::sync::Arc;

/// A file a core needs in its system directory before it can run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDependency {
    pub name: String,
    pub description: String,
}

impl FileDependency {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Emulation core trait
///
/// Lifecycle calls are serialized by the orchestrator. `run_frame` and
/// `inject_input` may arrive concurrently with them; `inject_input` must not
/// block.
#[async_trait]
pub trait EmulationCore: Send + Sync {
    /// Core name, also used to name its storage directories
    fn name(&self) -> &str;

    /// Extensions the core can load, lower-cased with a leading dot
    fn supported_extensions(&self) -> &[String];

    /// Files required in the system directory
    fn file_dependencies(&self) -> &[FileDependency];

    /// Load content and start emulation
    async fn start(
        &self,
        file: &FileHandle,
        root_folder: Option<&DirectoryHandle>,
    ) -> Result<(), CoreError>;

    /// Unload content
    async fn stop(&self) -> Result<(), CoreError>;

    /// Soft reset
    async fn reset(&self) -> Result<(), CoreError>;

    async fn pause(&self) -> Result<(), CoreError>;

    async fn resume(&self) -> Result<(), CoreError>;

    /// Run one frame
    async fn run_frame(&self) -> Result<(), CoreError>;

    /// Snapshot the running game into a slot
    async fn save_state(&self, slot: u32) -> Result<(), CoreError>;

    /// Restore a snapshot from a slot
    async fn load_state(&self, slot: u32) -> Result<(), CoreError>;

    /// Queue an input for the next frame
    fn inject_input(&self, player: PlayerSlot, input: InjectedInput);
}

/// Instantiate the core implementation selected in configuration
pub fn create_core(config: &CoreConfig) -> Arc<dyn EmulationCore> {
    let dependencies = config
        .dependencies
        .iter()
        .map(|d| FileDependency::new(&d.name, &d.description))
        .collect();

    match config.kind {
        CoreKind::Null => {
            tracing::debug!("Using null core for {}", config.name);
            Arc::new(NullCore::new(&config.name, config.extensions.clone(), dependencies))
        }
    }
}
