//! System catalog
//!
//! The catalog is the full list of systems the front-end offers, plus the
//! archive container extensions accepted next to every system's own.

use crate::cores::{create_core, EmulationCore};
use crate::system::{normalize_extension, SystemDescriptor};
use rx_core::{CatalogError, Config};
use rx_vfs::FileHandle;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Read-only set of system descriptors
#[derive(Debug)]
pub struct Catalog {
    systems: Vec<Arc<SystemDescriptor>>,
    archive_extensions: Vec<String>,
}

impl Catalog {
    pub fn new(
        systems: Vec<SystemDescriptor>,
        archive_extensions: &[String],
    ) -> Result<Self, CatalogError> {
        let mut symbols = HashSet::new();
        for system in &systems {
            if !symbols.insert(system.symbol().to_string()) {
                return Err(CatalogError::DuplicateSymbol(system.symbol().to_string()));
            }
        }

        let mut archives: Vec<String> = Vec::new();
        for raw in archive_extensions {
            let extension = normalize_extension(raw).ok_or_else(|| CatalogError::InvalidExtension {
                system: "archive".to_string(),
                extension: raw.clone(),
            })?;
            if !archives.contains(&extension) {
                archives.push(extension);
            }
        }

        Ok(Self {
            systems: systems.into_iter().map(Arc::new).collect(),
            archive_extensions: archives,
        })
    }

    /// Build the catalog described by configuration.
    ///
    /// Each configured core is instantiated once and shared by every system
    /// that references it.
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        let cores: HashMap<&str, Arc<dyn EmulationCore>> = config
            .cores
            .iter()
            .map(|c| (c.name.as_str(), create_core(c)))
            .collect();

        let mut systems = Vec::with_capacity(config.systems.len());
        for entry in &config.systems {
            let core = cores
                .get(entry.core.as_str())
                .cloned()
                .ok_or_else(|| CatalogError::UnknownCore {
                    system: entry.name.clone(),
                    core: entry.core.clone(),
                })?;

            let mut builder =
                SystemDescriptor::builder(&entry.name, &entry.manufacturer, &entry.symbol, core)
                    .multi_file_extensions(entry.multi_file_extensions.iter().cloned())
                    .dependencies_override(entry.dependencies_override);
            if let Some(extensions) = &entry.extensions {
                builder = builder.extensions(extensions.iter().cloned());
            }

            let system = builder.build()?;
            debug!("Registered system {:?}", system);
            systems.push(system);
        }

        let catalog = Self::new(systems, &config.general.archive_extensions)?;
        info!(
            "Catalog ready: {} systems, {} cores",
            catalog.systems.len(),
            cores.len()
        );
        Ok(catalog)
    }

    pub fn systems(&self) -> &[Arc<SystemDescriptor>] {
        &self.systems
    }

    pub fn archive_extensions(&self) -> &[String] {
        &self.archive_extensions
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Look a system up by symbol
    pub fn find(&self, symbol: &str) -> Option<&Arc<SystemDescriptor>> {
        self.systems.iter().find(|s| s.symbol() == symbol)
    }

    /// Systems that list the file's extension
    pub fn compatible_systems(&self, file: &FileHandle) -> Vec<Arc<SystemDescriptor>> {
        let Some(extension) = file.extension() else {
            return Vec::new();
        };

        self.systems
            .iter()
            .filter(|s| s.supports(&extension))
            .cloned()
            .collect()
    }
}
