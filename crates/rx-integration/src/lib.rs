//! Session orchestration layer for the retrox front-end
//!
//! This crate ties the user's system/game selection to the emulation cores:
//! - System descriptors and the catalog built from configuration
//! - Dependency and root-folder validation
//! - The orchestrator owning the single active session
//! - The selector reducing user and session events into offered state

pub mod catalog;
pub mod cores;
pub mod dependencies;
pub mod events;
pub mod folder;
pub mod notify;
pub mod orchestrator;
pub mod selector;
pub mod system;

pub use catalog::Catalog;
pub use cores::{create_core, EmulationCore, FileDependency, NullCore};
pub use dependencies::DependencyChecker;
pub use events::{ObserverId, ObserverPriority, ObserverRegistry, RuntimeFault, SessionEvent, SessionObserver};
pub use folder::FolderRequirementValidator;
pub use notify::{LogNotifier, Notification, Notifier};
pub use orchestrator::{EmulationOrchestrator, SessionId, SessionInfo, SessionPhase};
pub use selector::{SelectionPhase, SessionSelector, StartOutcome};
pub use system::{normalize_extension, SystemDescriptor, SystemDescriptorBuilder};
