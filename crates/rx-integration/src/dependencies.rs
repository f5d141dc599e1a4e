//! Dependency checking and per-core storage directories
//!
//! Cores that need firmware look for it in a per-core system directory
//! named `<core> - System` under the front-end's storage. Save data goes
//! to a sibling `<core> - Saves` directory.

use crate::system::SystemDescriptor;
use rx_core::StorageError;
use rx_vfs::{DirectoryHandle, Storage};
use std::sync::Arc;
use tracing::{debug, warn};

/// Name of the directory holding a core's dependency files
pub fn system_directory_name(core_name: &str) -> String {
    format!("{} - System", core_name)
}

/// Name of the directory holding a core's save data
pub fn save_directory_name(core_name: &str) -> String {
    format!("{} - Saves", core_name)
}

/// Checks that a system's dependency files are present
#[derive(Clone)]
pub struct DependencyChecker {
    storage: Arc<dyn Storage>,
}

impl DependencyChecker {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Resolve the system directory for a system's core, creating it if needed
    pub async fn system_directory(
        &self,
        system: &SystemDescriptor,
    ) -> Result<DirectoryHandle, StorageError> {
        let name = system_directory_name(system.core().name());
        self.storage.get_or_create_directory(&name).await
    }

    /// Resolve the save directory for a system's core, creating it if needed
    pub async fn save_directory(
        &self,
        system: &SystemDescriptor,
    ) -> Result<DirectoryHandle, StorageError> {
        let name = save_directory_name(system.core().name());
        self.storage.get_or_create_directory(&name).await
    }

    /// Check a system against its own system directory.
    ///
    /// A system directory that cannot be resolved counts as unmet.
    pub async fn check_met(&self, system: &SystemDescriptor) -> bool {
        if system.dependencies_override() {
            return true;
        }

        match self.system_directory(system).await {
            Ok(directory) => self.check_met_in(system, &directory).await,
            Err(e) => {
                warn!("Cannot open system directory for {}: {}", system.name(), e);
                false
            }
        }
    }

    /// Check a system against a given directory
    pub async fn check_met_in(&self, system: &SystemDescriptor, directory: &DirectoryHandle) -> bool {
        if system.dependencies_override() {
            return true;
        }

        for dependency in system.file_dependencies() {
            match self.storage.get_file(directory, &dependency.name).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    debug!(
                        "{} is missing {} ({}) in {}",
                        system.name(),
                        dependency.name,
                        dependency.description,
                        directory
                    );
                    return false;
                }
                Err(e) => {
                    warn!("Lookup of {} failed: {}", dependency.name, e);
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cores::{EmulationCore, FileDependency, NullCore};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rx_vfs::{FileHandle, HostStorage};

    /// Storage that fails every lookup and counts calls
    #[derive(Default)]
    struct BrokenStorage {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl Storage for BrokenStorage {
        async fn get_directory(&self, name: &str) -> Result<Option<DirectoryHandle>, StorageError> {
            *self.calls.lock() += 1;
            Err(StorageError::InvalidName(name.to_string()))
        }

        async fn create_directory(&self, name: &str) -> Result<DirectoryHandle, StorageError> {
            *self.calls.lock() += 1;
            Err(StorageError::InvalidName(name.to_string()))
        }

        async fn get_file(
            &self,
            _directory: &DirectoryHandle,
            name: &str,
        ) -> Result<Option<FileHandle>, StorageError> {
            *self.calls.lock() += 1;
            Err(StorageError::InvalidName(name.to_string()))
        }
    }

    fn psx(dependencies_override: bool) -> SystemDescriptor {
        let core: Arc<dyn EmulationCore> = Arc::new(NullCore::new(
            "Beetle PSX",
            vec![".cue".to_string()],
            vec![
                FileDependency::new("scph5500.bin", "PlayStation (Japan) BIOS"),
                FileDependency::new("scph5501.bin", "PlayStation (USA) BIOS"),
            ],
        ));
        SystemDescriptor::builder("PlayStation", "Sony", "psx", core)
            .dependencies_override(dependencies_override)
            .build()
            .unwrap()
    }

    #[test]
    fn test_system_directory_name() {
        assert_eq!(system_directory_name("Beetle PSX"), "Beetle PSX - System");
        assert_eq!(save_directory_name("Beetle PSX"), "Beetle PSX - Saves");
    }

    #[tokio::test]
    async fn test_override_skips_storage() {
        let storage = Arc::new(BrokenStorage::default());
        let checker = DependencyChecker::new(storage.clone());

        assert!(checker.check_met(&psx(true)).await);
        assert!(checker.check_met_in(&psx(true), &DirectoryHandle::new("/nowhere")).await);
        assert_eq!(*storage.calls.lock(), 0);
    }

    #[tokio::test]
    async fn test_storage_errors_count_as_unmet() {
        let checker = DependencyChecker::new(Arc::new(BrokenStorage::default()));

        assert!(!checker.check_met(&psx(false)).await);
        assert!(!checker.check_met_in(&psx(false), &DirectoryHandle::new("/nowhere")).await);
    }

    #[tokio::test]
    async fn test_all_files_required() {
        let root = tempfile::tempdir().unwrap();
        let checker = DependencyChecker::new(Arc::new(HostStorage::new(root.path())));
        let system = psx(false);

        // The first check creates the empty system directory
        assert!(!checker.check_met(&system).await);
        let dir = root.path().join("Beetle PSX - System");
        assert!(dir.is_dir());

        std::fs::write(dir.join("scph5500.bin"), b"bios").unwrap();
        assert!(!checker.check_met(&system).await);

        std::fs::write(dir.join("scph5501.bin"), b"bios").unwrap();
        assert!(checker.check_met(&system).await);
    }

    #[tokio::test]
    async fn test_save_directory_created_on_demand() {
        let root = tempfile::tempdir().unwrap();
        let checker = DependencyChecker::new(Arc::new(HostStorage::new(root.path())));
        let system = psx(true);

        let saves = checker.save_directory(&system).await.unwrap();
        assert_eq!(saves.path(), root.path().join("Beetle PSX - Saves"));
        assert!(root.path().join("Beetle PSX - Saves").is_dir());

        // Resolving again reuses the directory
        std::fs::write(saves.path().join("slot0.state"), b"state").unwrap();
        let again = checker.save_directory(&system).await.unwrap();
        assert_eq!(again.path(), saves.path());
        assert!(again.path().join("slot0.state").is_file());

        // Saves never count as system files
        assert!(!root.path().join("Beetle PSX - System").exists());
    }

    #[tokio::test]
    async fn test_save_directory_error() {
        let checker = DependencyChecker::new(Arc::new(BrokenStorage::default()));
        assert!(checker.save_directory(&psx(false)).await.is_err());
    }
}
