//! Emulation orchestrator owning the single active session
//!
//! Lifecycle operations (start, stop, reset, pause, resume, save, load and
//! fault handling) are serialized by an async lifecycle lock, so a stop
//! issued while a start is in flight runs once the start has finished.
//! Input injection bypasses that lock and only reads the session slot.
//!
//! Core faults never escape: every core call is wrapped so errors and panics
//! turn into `false` results, log lines and, for unrecoverable faults, a
//! forced stop announced by `RuntimeExceptionOccurred` then `Stopped`.

use crate::cores::EmulationCore;
use crate::dependencies::DependencyChecker;
use crate::events::{ObserverRegistry, RuntimeFault, SessionEvent};
use crate::system::SystemDescriptor;
use futures::FutureExt;
use parking_lot::RwLock;
use rx_core::{CoreError, FrontendError};
use rx_input::{InjectedInput, PlayerSlot};
use rx_vfs::{DirectoryHandle, FileHandle, Storage};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, trace, warn};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Core start in flight
    Starting,
    /// Session is running
    Running,
    /// Session is paused
    Paused,
    /// No session
    Stopped,
}

/// Identifies one session from start to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

#[derive(Clone)]
struct Session {
    id: SessionId,
    system: Arc<SystemDescriptor>,
    file: FileHandle,
    root_folder: Option<DirectoryHandle>,
    save_folder: Option<DirectoryHandle>,
    phase: SessionPhase,
    core: Arc<dyn EmulationCore>,
}

impl Session {
    fn is_live(&self) -> bool {
        matches!(self.phase, SessionPhase::Running | SessionPhase::Paused)
    }
}

/// Snapshot of the active session
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: SessionId,
    pub system: Arc<SystemDescriptor>,
    pub file: FileHandle,
    pub root_folder: Option<DirectoryHandle>,
    /// The core's `<core> - Saves` directory, when storage is attached
    pub save_folder: Option<DirectoryHandle>,
    pub phase: SessionPhase,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run a core call, turning a panic into an unrecoverable fault
async fn guarded<T, F>(call: F) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, CoreError>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(CoreError::Panicked(panic_message(payload.as_ref()))),
    }
}

/// Owner of the active emulation session
pub struct EmulationOrchestrator {
    /// Guarded session slot; never held across an await
    session: RwLock<Option<Session>>,
    /// Serializes lifecycle operations
    lifecycle: Mutex<()>,
    observers: ObserverRegistry,
    /// Monotonically increasing session ID counter
    next_session_id: AtomicU64,
    start_paused: bool,
    /// Resolves per-core save directories
    core_storage: Option<DependencyChecker>,
}

impl Default for EmulationOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulationOrchestrator {
    pub fn new() -> Self {
        Self {
            session: RwLock::new(None),
            lifecycle: Mutex::new(()),
            observers: ObserverRegistry::new(),
            next_session_id: AtomicU64::new(1),
            start_paused: false,
            core_storage: None,
        }
    }

    /// Pause every session right after it starts
    pub fn with_start_paused(mut self, start_paused: bool) -> Self {
        self.start_paused = start_paused;
        self
    }

    /// Resolve each session's save directory from `storage`
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.core_storage = Some(DependencyChecker::new(storage));
        self
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// Current phase, `Stopped` when no session exists
    pub fn phase(&self) -> SessionPhase {
        self.session
            .read()
            .as_ref()
            .map(|s| s.phase)
            .unwrap_or(SessionPhase::Stopped)
    }

    pub fn is_running(&self) -> bool {
        self.phase() == SessionPhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase() == SessionPhase::Paused
    }

    pub fn is_stopped(&self) -> bool {
        self.phase() == SessionPhase::Stopped
    }

    pub fn session(&self) -> Option<SessionInfo> {
        self.session.read().as_ref().map(|s| SessionInfo {
            id: s.id,
            system: s.system.clone(),
            file: s.file.clone(),
            root_folder: s.root_folder.clone(),
            save_folder: s.save_folder.clone(),
            phase: s.phase,
        })
    }

    /// Start a session, stopping the current one first.
    ///
    /// Returns `false` if the core rejects the content or fails to
    /// initialize; the slot is left empty in that case.
    pub async fn start(
        &self,
        system: Arc<SystemDescriptor>,
        file: FileHandle,
        root_folder: Option<DirectoryHandle>,
    ) -> bool {
        let _lifecycle = self.lifecycle.lock().await;

        self.stop_locked(false).await;

        let save_folder = self.resolve_save_folder(&system).await;
        let (id, core) = match self.claim_slot(&system, &file, root_folder.clone(), save_folder) {
            Ok(claimed) => claimed,
            Err(e) => {
                error!("Refusing to start {}: {}", file, e);
                return false;
            }
        };

        info!("Starting {} on {} ({})", file.name(), system.name(), core.name());

        if let Err(e) = guarded(core.start(&file, root_folder.as_ref())).await {
            warn!("{} failed to start {}: {}", core.name(), file.name(), e);
            self.session.write().take();
            if let Err(e) = guarded(core.stop()).await {
                debug!("Cleanup after failed start: {}", e);
            }
            return false;
        }

        self.set_phase(id, SessionPhase::Running);
        info!("Session {:?} running", id);
        self.observers.emit(&SessionEvent::Started {
            system: system.clone(),
            file,
        });

        if self.start_paused {
            self.pause_locked().await;
        }
        true
    }

    /// Stop the active session; no-op without one
    pub async fn stop(&self, perform_back_navigation: bool) {
        let _lifecycle = self.lifecycle.lock().await;
        self.stop_locked(perform_back_navigation).await;
    }

    /// Soft-reset the running game
    pub async fn reset(&self) {
        let _lifecycle = self.lifecycle.lock().await;

        let Some(session) = self.live_session() else {
            warn!("Reset requested without an active session");
            return;
        };

        info!("Resetting {}", session.file.name());
        if let Err(e) = guarded(session.core.reset()).await {
            self.handle_fault_locked(session.id, e).await;
        }
    }

    /// Pause the running session; no-op unless running
    pub async fn pause(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        self.pause_locked().await;
    }

    /// Resume the paused session; no-op unless paused
    pub async fn resume(&self) {
        let _lifecycle = self.lifecycle.lock().await;

        let Some(session) = self.session_in(SessionPhase::Paused) else {
            trace!("Resume ignored in phase {:?}", self.phase());
            return;
        };

        match guarded(session.core.resume()).await {
            Ok(()) => {
                info!("Resuming {}", session.file.name());
                self.set_phase(session.id, SessionPhase::Running);
            }
            Err(e) => self.handle_fault_locked(session.id, e).await,
        }
    }

    /// Save a snapshot into `slot`; `false` without a session or on failure
    pub async fn save_state(&self, slot: u32) -> bool {
        let _lifecycle = self.lifecycle.lock().await;

        let Some(session) = self.live_session() else {
            debug!("Save state requested without an active session");
            return false;
        };

        match guarded(session.core.save_state(slot)).await {
            Ok(()) => {
                info!("Saved state to slot {}", slot);
                true
            }
            Err(e) => {
                self.handle_fault_locked(session.id, e).await;
                false
            }
        }
    }

    /// Restore the snapshot in `slot`; `false` without a session or on failure
    pub async fn load_state(&self, slot: u32) -> bool {
        let _lifecycle = self.lifecycle.lock().await;

        let Some(session) = self.live_session() else {
            debug!("Load state requested without an active session");
            return false;
        };

        match guarded(session.core.load_state(slot)).await {
            Ok(()) => {
                info!("Loaded state from slot {}", slot);
                true
            }
            Err(e) => {
                self.handle_fault_locked(session.id, e).await;
                false
            }
        }
    }

    /// Forward an input to the running core; dropped otherwise.
    ///
    /// Never waits on the lifecycle lock.
    pub fn inject_input(&self, player: PlayerSlot, input: InjectedInput) {
        let core = match self.session.read().as_ref() {
            Some(s) if s.phase == SessionPhase::Running => s.core.clone(),
            _ => {
                trace!("Dropping {:?} for {}: no running session", input, player);
                return;
            }
        };
        core.inject_input(player, input);
    }

    /// Run one frame of the running session.
    ///
    /// Returns `false` when nothing ran. Unrecoverable faults end the
    /// session.
    pub async fn run_frame(&self) -> bool {
        let Some(session) = self.session_in(SessionPhase::Running) else {
            return false;
        };

        match guarded(session.core.run_frame()).await {
            Ok(()) => true,
            Err(e) => {
                let _lifecycle = self.lifecycle.lock().await;
                self.handle_fault_locked(session.id, e).await;
                false
            }
        }
    }

    /// Report a fault raised by the core outside an orchestrator call
    pub async fn report_runtime_fault(&self, fault: CoreError) {
        let _lifecycle = self.lifecycle.lock().await;

        match self.live_session() {
            Some(session) => self.handle_fault_locked(session.id, fault).await,
            None => debug!("Ignoring fault without an active session: {}", fault),
        }
    }

    fn live_session(&self) -> Option<Session> {
        self.session.read().as_ref().filter(|s| s.is_live()).cloned()
    }

    fn session_in(&self, phase: SessionPhase) -> Option<Session> {
        self.session.read().as_ref().filter(|s| s.phase == phase).cloned()
    }

    fn set_phase(&self, id: SessionId, phase: SessionPhase) {
        if let Some(session) = self.session.write().as_mut().filter(|s| s.id == id) {
            session.phase = phase;
        }
    }

    /// Saves are optional; a storage error only costs the save directory
    async fn resolve_save_folder(&self, system: &SystemDescriptor) -> Option<DirectoryHandle> {
        let storage = self.core_storage.as_ref()?;
        match storage.save_directory(system).await {
            Ok(directory) => Some(directory),
            Err(e) => {
                warn!("No save directory for {}: {}", system.core().name(), e);
                None
            }
        }
    }

    /// Put a new session in the slot, failing if it is occupied
    fn claim_slot(
        &self,
        system: &Arc<SystemDescriptor>,
        file: &FileHandle,
        root_folder: Option<DirectoryHandle>,
        save_folder: Option<DirectoryHandle>,
    ) -> Result<(SessionId, Arc<dyn EmulationCore>), FrontendError> {
        let mut slot = self.session.write();
        if let Some(existing) = slot.as_ref() {
            return Err(FrontendError::SessionActive(existing.system.name().to_string()));
        }

        let id = SessionId(self.next_session_id.fetch_add(1, Ordering::SeqCst));
        let core = system.core().clone();
        *slot = Some(Session {
            id,
            system: system.clone(),
            file: file.clone(),
            root_folder,
            save_folder,
            phase: SessionPhase::Starting,
            core: core.clone(),
        });
        Ok((id, core))
    }

    async fn pause_locked(&self) {
        let Some(session) = self.session_in(SessionPhase::Running) else {
            trace!("Pause ignored in phase {:?}", self.phase());
            return;
        };

        match guarded(session.core.pause()).await {
            Ok(()) => {
                info!("Pausing {}", session.file.name());
                self.set_phase(session.id, SessionPhase::Paused);
            }
            Err(e) => self.handle_fault_locked(session.id, e).await,
        }
    }

    async fn stop_locked(&self, perform_back_navigation: bool) {
        let taken = self.session.write().take();
        let Some(session) = taken else {
            return;
        };

        info!("Stopping {}", session.file.name());
        if let Err(e) = guarded(session.core.stop()).await {
            warn!("{} reported an error while stopping: {}", session.core.name(), e);
        }

        self.observers.emit(&SessionEvent::Stopped {
            system: session.system,
            perform_back_navigation,
        });
    }

    /// Log recoverable faults; tear the session down on unrecoverable ones
    async fn handle_fault_locked(&self, id: SessionId, fault: CoreError) {
        if !fault.is_unrecoverable() {
            warn!("Core reported a recoverable fault: {}", fault);
            return;
        }

        let session = {
            let mut slot = self.session.write();
            if slot.as_ref().is_some_and(|s| s.id == id) {
                slot.take()
            } else {
                None
            }
        };
        let Some(session) = session else {
            debug!("Fault from a session that already ended: {}", fault);
            return;
        };

        error!("Session {:?} on {} faulted: {}", id, session.system.name(), fault);
        if let Err(e) = guarded(session.core.stop()).await {
            debug!("Stop after fault failed: {}", e);
        }

        self.observers
            .emit(&SessionEvent::RuntimeExceptionOccurred(RuntimeFault {
                system: session.system.clone(),
                error: fault,
            }));
        self.observers.emit(&SessionEvent::Stopped {
            system: session.system,
            perform_back_navigation: true,
        });
    }
}
