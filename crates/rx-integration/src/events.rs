//! Session lifecycle events and their observers
//!
//! Observers are called synchronously, in priority order and then in
//! registration order. Selection-level observers run before presentation
//! observers, so the offered systems are already reset when the UI reacts
//! to a stop.

use crate::system::SystemDescriptor;
use parking_lot::RwLock;
use rx_core::CoreError;
use rx_vfs::FileHandle;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Fault that ended a session
#[derive(Debug, Clone)]
pub struct RuntimeFault {
    pub system: Arc<SystemDescriptor>,
    pub error: CoreError,
}

/// Event emitted by the orchestrator
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Started {
        system: Arc<SystemDescriptor>,
        file: FileHandle,
    },
    Stopped {
        system: Arc<SystemDescriptor>,
        perform_back_navigation: bool,
    },
    RuntimeExceptionOccurred(RuntimeFault),
}

impl SessionEvent {
    pub fn system(&self) -> &Arc<SystemDescriptor> {
        match self {
            SessionEvent::Started { system, .. } => system,
            SessionEvent::Stopped { system, .. } => system,
            SessionEvent::RuntimeExceptionOccurred(fault) => &fault.system,
        }
    }
}

/// Order in which observer groups see an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObserverPriority {
    /// Selection state that the UI renders from
    Selection,
    /// UI and other consumers
    Presentation,
}

/// Receives session events.
///
/// Called with no orchestrator lock held other than the lifecycle lock, so
/// observers must not await orchestrator operations from inside the call.
pub trait SessionObserver: Send + Sync {
    fn on_session_event(&self, event: &SessionEvent);
}

impl<F> SessionObserver for F
where
    F: Fn(&SessionEvent) + Send + Sync,
{
    fn on_session_event(&self, event: &SessionEvent) {
        self(event)
    }
}

/// Handle returned by registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

struct Registration {
    id: ObserverId,
    priority: ObserverPriority,
    observer: Arc<dyn SessionObserver>,
}

/// Ordered list of session observers
#[derive(Default)]
pub struct ObserverRegistry {
    observers: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        priority: ObserverPriority,
        observer: Arc<dyn SessionObserver>,
    ) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut observers = self.observers.write();

        // Keep the list sorted; equal priorities stay in registration order
        let position = observers
            .iter()
            .position(|r| r.priority > priority)
            .unwrap_or(observers.len());
        observers.insert(
            position,
            Registration {
                id,
                priority,
                observer,
            },
        );

        tracing::trace!("Registered observer {:?} at {:?}", id, priority);
        id
    }

    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|r| r.id != id);
        observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Deliver an event to every observer.
    ///
    /// Works on a snapshot so observers may register or unregister while
    /// being notified.
    pub fn emit(&self, event: &SessionEvent) {
        let snapshot: Vec<Arc<dyn SessionObserver>> = self
            .observers
            .read()
            .iter()
            .map(|r| r.observer.clone())
            .collect();

        for observer in snapshot {
            observer.on_session_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cores::{EmulationCore, NullCore};
    use parking_lot::Mutex;

    fn system() -> Arc<SystemDescriptor> {
        let core: Arc<dyn EmulationCore> =
            Arc::new(NullCore::new("Snes9x", vec![".sfc".to_string()], Vec::new()));
        Arc::new(SystemDescriptor::builder("SNES", "Nintendo", "snes", core).build().unwrap())
    }

    fn stopped() -> SessionEvent {
        SessionEvent::Stopped {
            system: system(),
            perform_back_navigation: false,
        }
    }

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Arc<dyn SessionObserver> {
        let log = log.clone();
        Arc::new(move |_: &SessionEvent| log.lock().push(tag))
    }

    #[test]
    fn test_priority_order() {
        let registry = ObserverRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.register(ObserverPriority::Presentation, recorder(&log, "ui-1"));
        registry.register(ObserverPriority::Selection, recorder(&log, "selector"));
        registry.register(ObserverPriority::Presentation, recorder(&log, "ui-2"));

        registry.emit(&stopped());
        assert_eq!(*log.lock(), vec!["selector", "ui-1", "ui-2"]);
    }

    #[test]
    fn test_unregister() {
        let registry = ObserverRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let id = registry.register(ObserverPriority::Presentation, recorder(&log, "ui"));
        assert_eq!(registry.len(), 1);
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(registry.is_empty());

        registry.emit(&stopped());
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_event_system() {
        let event = stopped();
        assert_eq!(event.system().symbol(), "snes");
    }
}
