//! Selection state machine
//!
//! The selector holds what the UI offers: the set of systems to pick from
//! and, while the user disambiguates, the file waiting for a system. It
//! turns user actions into start attempts and session events back into the
//! full catalog.
//!
//! ```text
//! Idle ──open_file (n>1)──▶ AwaitingDisambiguation ──select_system──┐
//!  │                                                                 ▼
//!  ├──open_file (n=1) / select_system + pick ──────────────────▶ Starting ──Started──▶ Running
//!  ▲                                                                 │                   │
//!  └────────────── failure, Stopped or RuntimeExceptionOccurred ◀────┴───────────────────┘
//! ```

use crate::catalog::Catalog;
use crate::dependencies::DependencyChecker;
use crate::events::{ObserverPriority, SessionEvent, SessionObserver};
use crate::folder::FolderRequirementValidator;
use crate::notify::{self, Notification, Notifier};
use crate::orchestrator::EmulationOrchestrator;
use crate::system::SystemDescriptor;
use parking_lot::Mutex;
use rx_vfs::{FilePicker, FileHandle, Storage};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the selector is in the select → start flow
#[derive(Debug, Clone)]
pub enum SelectionPhase {
    /// Showing the offered systems, nothing staged
    Idle,
    /// Several systems accept the staged file; waiting for the user
    AwaitingDisambiguation { staged: FileHandle },
    /// Validation or core start in flight
    Starting {
        system: Arc<SystemDescriptor>,
        file: FileHandle,
    },
    /// A session is running
    Running { system: Arc<SystemDescriptor> },
}

/// Result of a selector operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The session started
    Started,
    /// The user cancelled a pick
    Cancelled,
    /// Dependency files are missing
    UnmetDependencies,
    /// The picked root folder does not contain the game
    InvalidFolder,
    /// The core refused the game
    LoadingFailed,
    /// Several systems accept the file; one must be selected
    AwaitingDisambiguation,
    /// No system accepts the file
    Unsupported,
    /// Another selector operation is in flight
    Busy,
    /// The system is not among the offered ones
    NotOffered,
}

struct SelectionState {
    offered: Vec<Arc<SystemDescriptor>>,
    phase: SelectionPhase,
}

impl SelectionState {
    fn idle(catalog: &Catalog) -> Self {
        Self {
            offered: catalog.systems().to_vec(),
            phase: SelectionPhase::Idle,
        }
    }
}

/// Resets the selection whenever a session ends
struct SelectionResetHandler {
    catalog: Arc<Catalog>,
    notifier: Arc<dyn Notifier>,
    state: Arc<Mutex<SelectionState>>,
}

impl SessionObserver for SelectionResetHandler {
    fn on_session_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::Started { system, .. } => {
                // Sessions started behind the selector's back also drop any
                // pending disambiguation
                let mut state = self.state.lock();
                state.offered = self.catalog.systems().to_vec();
                state.phase = SelectionPhase::Running {
                    system: system.clone(),
                };
            }
            SessionEvent::RuntimeExceptionOccurred(fault) => {
                warn!("{} stopped after a fault: {}", fault.system.name(), fault.error);
                notify::send(self.notifier.as_ref(), Notification::GameRunningFailed);
                *self.state.lock() = SelectionState::idle(&self.catalog);
            }
            SessionEvent::Stopped { .. } => {
                *self.state.lock() = SelectionState::idle(&self.catalog);
            }
        }
    }
}

/// User-facing selection flow on top of the orchestrator
pub struct SessionSelector {
    catalog: Arc<Catalog>,
    orchestrator: Arc<EmulationOrchestrator>,
    picker: Arc<dyn FilePicker>,
    notifier: Arc<dyn Notifier>,
    dependencies: DependencyChecker,
    folders: FolderRequirementValidator,
    state: Arc<Mutex<SelectionState>>,
    /// Held for the whole of a user operation
    attempt: tokio::sync::Mutex<()>,
}

impl SessionSelector {
    /// Create a selector and register its reset handler with the orchestrator
    pub fn new(
        catalog: Arc<Catalog>,
        orchestrator: Arc<EmulationOrchestrator>,
        storage: Arc<dyn Storage>,
        picker: Arc<dyn FilePicker>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let state = Arc::new(Mutex::new(SelectionState::idle(&catalog)));

        orchestrator.observers().register(
            ObserverPriority::Selection,
            Arc::new(SelectionResetHandler {
                catalog: catalog.clone(),
                notifier: notifier.clone(),
                state: state.clone(),
            }),
        );

        Self {
            catalog,
            orchestrator,
            picker,
            notifier,
            dependencies: DependencyChecker::new(storage),
            folders: FolderRequirementValidator::new(),
            state,
            attempt: tokio::sync::Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn orchestrator(&self) -> &Arc<EmulationOrchestrator> {
        &self.orchestrator
    }

    /// Systems currently offered to the user
    pub fn offered_systems(&self) -> Vec<Arc<SystemDescriptor>> {
        self.state.lock().offered.clone()
    }

    pub fn phase(&self) -> SelectionPhase {
        self.state.lock().phase.clone()
    }

    /// File waiting for a system or being started
    pub fn staged_file(&self) -> Option<FileHandle> {
        match &self.state.lock().phase {
            SelectionPhase::AwaitingDisambiguation { staged } => Some(staged.clone()),
            SelectionPhase::Starting { file, .. } => Some(file.clone()),
            _ => None,
        }
    }

    /// The user tapped a system.
    ///
    /// While disambiguating, this starts the staged file on that system.
    /// Otherwise the user is asked for a file the system can load.
    pub async fn select_system(&self, system: &Arc<SystemDescriptor>) -> StartOutcome {
        let Ok(_attempt) = self.attempt.try_lock() else {
            debug!("Ignoring selection of {}: busy", system.name());
            return StartOutcome::Busy;
        };

        let staged = {
            let state = self.state.lock();
            match &state.phase {
                SelectionPhase::AwaitingDisambiguation { staged } => {
                    if !state.offered.iter().any(|s| Arc::ptr_eq(s, system)) {
                        debug!("{} is not offered for {}", system.name(), staged.name());
                        return StartOutcome::NotOffered;
                    }
                    Some(staged.clone())
                }
                _ => None,
            }
        };

        let file = match staged {
            Some(file) => file,
            None => {
                let extensions = system.pick_extensions(self.catalog.archive_extensions());
                match self.picker.pick_file(&extensions).await {
                    Some(file) => file,
                    None => {
                        debug!("File pick for {} cancelled", system.name());
                        return StartOutcome::Cancelled;
                    }
                }
            }
        };

        self.start_attempt(system.clone(), file).await
    }

    /// A file was supplied from outside, e.g. "open with"
    pub async fn open_file(&self, file: FileHandle) -> StartOutcome {
        let Ok(_attempt) = self.attempt.try_lock() else {
            debug!("Ignoring {}: busy", file.name());
            return StartOutcome::Busy;
        };

        let mut compatible = self.catalog.compatible_systems(&file);
        match compatible.len() {
            0 => {
                info!("No system can open {}", file.name());
                StartOutcome::Unsupported
            }
            1 => {
                let system = compatible.remove(0);
                self.start_attempt(system, file).await
            }
            n => {
                info!("{} matches {} systems, waiting for a choice", file.name(), n);
                self.orchestrator.stop(false).await;

                let mut state = self.state.lock();
                state.offered = compatible;
                state.phase = SelectionPhase::AwaitingDisambiguation { staged: file };
                StartOutcome::AwaitingDisambiguation
            }
        }
    }

    async fn start_attempt(&self, system: Arc<SystemDescriptor>, file: FileHandle) -> StartOutcome {
        self.state.lock().phase = SelectionPhase::Starting {
            system: system.clone(),
            file: file.clone(),
        };
        info!("Start attempt: {} on {}", file.name(), system.name());

        if !self.dependencies.check_met(&system).await {
            self.fail(Notification::SystemUnmetDependencies);
            return StartOutcome::UnmetDependencies;
        }

        let mut root_folder = None;
        if self.folders.is_folder_required(&system, &file.name()) {
            notify::send(self.notifier.as_ref(), Notification::SelectFolderRequest);

            let Some(folder) = self.picker.pick_directory().await else {
                debug!("Folder pick for {} cancelled", file.name());
                self.reset();
                return StartOutcome::Cancelled;
            };

            if !self.folders.is_folder_valid(&file, &folder) {
                warn!("{} is not inside {}", file, folder);
                self.fail(Notification::SelectFolderInvalid);
                return StartOutcome::InvalidFolder;
            }
            root_folder = Some(folder);
        }

        if !self.orchestrator.start(system, file, root_folder).await {
            self.fail(Notification::GameLoadingFailed);
            return StartOutcome::LoadingFailed;
        }

        StartOutcome::Started
    }

    fn fail(&self, notification: Notification) {
        notify::send(self.notifier.as_ref(), notification);
        self.reset();
    }

    fn reset(&self) {
        *self.state.lock() = SelectionState::idle(&self.catalog);
    }
}
