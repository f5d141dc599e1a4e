//! Test doubles shared by the session flow tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rx_core::{CoreError, StorageError};
use rx_input::{InjectedInput, PlayerSlot};
use rx_integration::{
    Catalog, EmulationCore, EmulationOrchestrator, FileDependency, Notifier, SessionEvent,
    SessionSelector, SystemDescriptor,
};
use rx_vfs::{DirectoryHandle, FileHandle, FilePicker, Storage};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared, ordered log of core calls and session events
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Core that records every call and can hold `start` until released
pub struct ScriptedCore {
    name: String,
    extensions: Vec<String>,
    dependencies: Vec<FileDependency>,
    log: CallLog,
    accept: bool,
    gate: Option<Arc<Notify>>,
    pub entered_start: Arc<Notify>,
    pub inputs: Mutex<Vec<(PlayerSlot, InjectedInput)>>,
    pub fault_on_frame: Mutex<Option<CoreError>>,
}

impl ScriptedCore {
    pub fn new(name: &str, extensions: &[&str], log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            dependencies: Vec::new(),
            log: log.clone(),
            accept: true,
            gate: None,
            entered_start: Arc::new(Notify::new()),
            inputs: Mutex::new(Vec::new()),
            fault_on_frame: Mutex::new(None),
        }
    }

    pub fn with_dependencies(mut self, names: &[&str]) -> Self {
        self.dependencies = names
            .iter()
            .map(|n| FileDependency::new(*n, "firmware"))
            .collect();
        self
    }

    /// Make `start` fail
    pub fn rejecting(mut self) -> Self {
        self.accept = false;
        self
    }

    /// Make `start` wait for the returned gate
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    fn record(&self, call: impl Into<String>) {
        self.log.lock().push(format!("{}:{}", self.name, call.into()));
    }
}

#[async_trait]
impl EmulationCore for ScriptedCore {
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
        self.entered_start.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match root_folder {
            Some(folder) => self.record(format!("start {} in {}", file.name(), folder)),
            None => self.record(format!("start {}", file.name())),
        }

        if self.accept {
            Ok(())
        } else {
            Err(CoreError::Rejected(file.name()))
        }
    }

    async fn stop(&self) -> Result<(), CoreError> {
        self.record("stop");
        Ok(())
    }

    async fn reset(&self) -> Result<(), CoreError> {
        self.record("reset");
        Ok(())
    }

    async fn pause(&self) -> Result<(), CoreError> {
        self.record("pause");
        Ok(())
    }

    async fn resume(&self) -> Result<(), CoreError> {
        self.record("resume");
        Ok(())
    }

    async fn run_frame(&self) -> Result<(), CoreError> {
        match self.fault_on_frame.lock().take() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    async fn save_state(&self, slot: u32) -> Result<(), CoreError> {
        self.record(format!("save {}", slot));
        Ok(())
    }

    async fn load_state(&self, slot: u32) -> Result<(), CoreError> {
        self.record(format!("load {}", slot));
        Ok(())
    }

    fn inject_input(&self, player: PlayerSlot, input: InjectedInput) {
        self.inputs.lock().push((player, input));
    }
}

/// Picker answering from fixed values and counting calls
#[derive(Default)]
pub struct ScriptedPicker {
    pub file: Mutex<Option<FileHandle>>,
    pub directory: Mutex<Option<DirectoryHandle>>,
    pub file_picks: Mutex<Vec<Vec<String>>>,
    pub directory_picks: Mutex<usize>,
}

impl ScriptedPicker {
    pub fn with_file(path: &str) -> Self {
        let picker = Self::default();
        *picker.file.lock() = Some(FileHandle::new(path));
        picker
    }

    pub fn set_directory(&self, path: &str) {
        *self.directory.lock() = Some(DirectoryHandle::new(path));
    }
}

#[async_trait]
impl FilePicker for ScriptedPicker {
    async fn pick_file(&self, extensions: &[String]) -> Option<FileHandle> {
        self.file_picks.lock().push(extensions.to_vec());
        self.file.lock().clone()
    }

    async fn pick_directory(&self) -> Option<DirectoryHandle> {
        *self.directory_picks.lock() += 1;
        self.directory.lock().clone()
    }
}

/// Notifier keeping the title keys it was given
#[derive(Default)]
pub struct RecordingNotifier {
    pub titles: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn count(&self, title_key: &str) -> usize {
        self.titles.lock().iter().filter(|t| *t == title_key).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title_key: &str, _message_key: &str) {
        self.titles.lock().push(title_key.to_string());
    }
}

/// In-memory storage rooted at `/storage`
#[derive(Default)]
pub struct MemoryStorage {
    directories: Mutex<HashMap<String, HashSet<String>>>,
    pub calls: Mutex<usize>,
}

impl MemoryStorage {
    pub fn add_file(&self, directory: &str, name: &str) {
        self.directories
            .lock()
            .entry(directory.to_string())
            .or_default()
            .insert(name.to_string());
    }

    fn handle(name: &str) -> DirectoryHandle {
        DirectoryHandle::new(format!("/storage/{}", name))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_directory(&self, name: &str) -> Result<Option<DirectoryHandle>, StorageError> {
        *self.calls.lock() += 1;
        Ok(self
            .directories
            .lock()
            .contains_key(name)
            .then(|| Self::handle(name)))
    }

    async fn create_directory(&self, name: &str) -> Result<DirectoryHandle, StorageError> {
        *self.calls.lock() += 1;
        self.directories.lock().entry(name.to_string()).or_default();
        Ok(Self::handle(name))
    }

    async fn get_file(
        &self,
        directory: &DirectoryHandle,
        name: &str,
    ) -> Result<Option<FileHandle>, StorageError> {
        *self.calls.lock() += 1;
        let found = self
            .directories
            .lock()
            .get(&directory.name())
            .is_some_and(|files| files.contains(name));
        Ok(found.then(|| FileHandle::new(directory.path().join(name))))
    }
}

/// Selector wired to test doubles
pub struct Harness {
    pub selector: Arc<SessionSelector>,
    pub orchestrator: Arc<EmulationOrchestrator>,
    pub picker: Arc<ScriptedPicker>,
    pub notifier: Arc<RecordingNotifier>,
    pub storage: Arc<MemoryStorage>,
    pub log: CallLog,
}

impl Harness {
    pub fn new(systems: Vec<SystemDescriptor>, log: CallLog) -> Self {
        Self::with_picker(systems, log, ScriptedPicker::default())
    }

    pub fn with_picker(systems: Vec<SystemDescriptor>, log: CallLog, picker: ScriptedPicker) -> Self {
        let catalog = Arc::new(Catalog::new(systems, &[".zip".to_string()]).unwrap());
        let orchestrator = Arc::new(EmulationOrchestrator::new());
        let picker = Arc::new(picker);
        let notifier = Arc::new(RecordingNotifier::default());
        let storage = Arc::new(MemoryStorage::default());

        let selector = Arc::new(SessionSelector::new(
            catalog,
            orchestrator.clone(),
            storage.clone(),
            picker.clone(),
            notifier.clone(),
        ));

        // Presentation observers see events after the selector
        let events = log.clone();
        orchestrator.observers().register(
            rx_integration::ObserverPriority::Presentation,
            Arc::new(move |event: &SessionEvent| {
                let name = match event {
                    SessionEvent::Started { .. } => "started",
                    SessionEvent::Stopped { .. } => "stopped",
                    SessionEvent::RuntimeExceptionOccurred(_) => "runtime-exception",
                };
                events.lock().push(format!("event:{}", name));
            }),
        );

        Self {
            selector,
            orchestrator,
            picker,
            notifier,
            storage,
            log,
        }
    }

    pub fn system(&self, symbol: &str) -> Arc<SystemDescriptor> {
        self.selector.catalog().find(symbol).unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn offered_symbols(&self) -> Vec<String> {
        self.selector
            .offered_systems()
            .iter()
            .map(|s| s.symbol().to_string())
            .collect()
    }
}

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn system(name: &str, symbol: &str, core: Arc<dyn EmulationCore>) -> SystemDescriptor {
    SystemDescriptor::builder(name, "Test", symbol, core)
        .build()
        .unwrap()
}
