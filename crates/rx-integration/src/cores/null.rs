//! Null core for headless runs and testing

use super::{EmulationCore, FileDependency};
use crate::system::normalize_extension;
use async_trait::async_trait;
use parking_lot::Mutex;
use rx_core::CoreError;
use rx_input::joypad::MAX_PLAYERS;
use rx_input::{InjectedInput, JoypadButtons, JoypadState, PlayerSlot};
use rx_vfs::{DirectoryHandle, FileHandle};
use std::collections::HashMap;

/// Core that loads nothing but behaves like one from the outside.
///
/// It accepts any non-empty file with a supported extension, counts frames
/// while running, latches injected inputs per player and keeps save states
/// in memory. Nothing is emulated.
pub struct NullCore {
    name: String,
    extensions: Vec<String>,
    dependencies: Vec<FileDependency>,
    state: Mutex<NullCoreState>,
}

#[derive(Default)]
struct NullCoreState {
    loaded: Option<FileHandle>,
    paused: bool,
    frame: u64,
    players: [JoypadState; MAX_PLAYERS as usize],
    /// Frame number captured per slot
    slots: HashMap<u32, u64>,
    /// Buttons seen by the last frame, per player
    last_input: [JoypadButtons; MAX_PLAYERS as usize],
}

impl NullCore {
    pub fn new(name: &str, extensions: Vec<String>, dependencies: Vec<FileDependency>) -> Self {
        let extensions = extensions
            .iter()
            .filter_map(|e| normalize_extension(e))
            .collect();

        Self {
            name: name.to_string(),
            extensions,
            dependencies,
            state: Mutex::new(NullCoreState::default()),
        }
    }

    /// Loaded content, if any
    pub fn loaded(&self) -> Option<FileHandle> {
        self.state.lock().loaded.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub fn frame_count(&self) -> u64 {
        self.state.lock().frame
    }

    /// Buttons consumed by the most recent frame for a player
    pub fn last_input(&self, player: PlayerSlot) -> JoypadButtons {
        self.state.lock().last_input[player.index()]
    }

    fn require_loaded(state: &NullCoreState, operation: &str) -> Result<(), CoreError> {
        if state.loaded.is_none() {
            return Err(CoreError::recoverable(format!("{} without loaded content", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl EmulationCore for NullCore {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_extensions(&self) -> &[String] {
        &self.extensions
    }

    fn file_dependencies(&self) -> &[FileDependency] {
        &self.dependencies
    }

    async fn start(
        &self,
        file: &FileHandle,
        root_folder: Option<&DirectoryHandle>,
    ) -> Result<(), CoreError> {
        let supported = file
            .extension()
            .map(|ext| self.extensions.contains(&ext))
            .unwrap_or(false);
        if !supported {
            return Err(CoreError::Rejected(format!("{} is not a supported file type", file.name())));
        }

        let meta = tokio::fs::metadata(file.path())
            .await
            .map_err(|e| CoreError::Rejected(format!("cannot read {}: {}", file, e)))?;
        if !meta.is_file() || meta.len() == 0 {
            return Err(CoreError::Rejected(format!("{} is empty", file.name())));
        }

        if let Some(folder) = root_folder {
            let is_dir = tokio::fs::metadata(folder.path())
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if !is_dir {
                return Err(CoreError::InitFailed(format!("root folder {} is missing", folder)));
            }
        }

        let mut state = self.state.lock();
        *state = NullCoreState {
            loaded: Some(file.clone()),
            ..NullCoreState::default()
        };
        tracing::debug!("[{}] Loaded {} ({} bytes)", self.name, file.name(), meta.len());
        Ok(())
    }

    async fn stop(&self) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        if let Some(file) = state.loaded.take() {
            tracing::debug!("[{}] Unloaded {} after {} frames", self.name, file.name(), state.frame);
        }
        state.paused = false;
        state.slots.clear();
        Ok(())
    }

    async fn reset(&self) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        Self::require_loaded(&state, "reset")?;
        state.frame = 0;
        Ok(())
    }

    async fn pause(&self) -> Result<(), CoreError> {
        self.state.lock().paused = true;
        Ok(())
    }

    async fn resume(&self) -> Result<(), CoreError> {
        self.state.lock().paused = false;
        Ok(())
    }

    async fn run_frame(&self) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        if state.loaded.is_none() || state.paused {
            return Ok(());
        }

        let state = &mut *state;
        for (player, last) in state.players.iter_mut().zip(state.last_input.iter_mut()) {
            *last = player.poll();
        }
        state.frame += 1;
        Ok(())
    }

    async fn save_state(&self, slot: u32) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        Self::require_loaded(&state, "save state")?;
        let frame = state.frame;
        state.slots.insert(slot, frame);
        Ok(())
    }

    async fn load_state(&self, slot: u32) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        Self::require_loaded(&state, "load state")?;
        let frame = *state
            .slots
            .get(&slot)
            .ok_or_else(|| CoreError::recoverable(format!("no state in slot {}", slot)))?;
        state.frame = frame;
        Ok(())
    }

    fn inject_input(&self, player: PlayerSlot, input: InjectedInput) {
        let mut state = self.state.lock();
        if state.loaded.is_some() {
            state.players[player.index()].press(input);
        }
    }
}
