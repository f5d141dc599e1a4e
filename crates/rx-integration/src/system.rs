//! System descriptors
//!
//! A descriptor is what the user picks from: one emulated system, the file
//! types it loads and the core that runs it. Descriptors are built once with
//! the catalog and never change afterwards.

use crate::cores::{EmulationCore, FileDependency};
use rx_core::CatalogError;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Lower-case an extension and give it a leading dot.
///
/// Returns `None` for input that cannot be an extension (empty, a lone dot,
/// containing separators or whitespace).
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);

    let malformed = bare.is_empty()
        || bare
            .chars()
            .any(|c| c == '.' || c == '/' || c == '\\' || c.is_whitespace());
    if malformed {
        return None;
    }

    Some(format!(".{}", bare.to_lowercase()))
}

/// Immutable description of one emulated system
pub struct SystemDescriptor {
    name: String,
    manufacturer: String,
    symbol: String,
    supported_extensions: BTreeSet<String>,
    multi_file_extensions: BTreeSet<String>,
    dependencies_override: bool,
    core: Arc<dyn EmulationCore>,
}

impl SystemDescriptor {
    pub fn builder(
        name: impl Into<String>,
        manufacturer: impl Into<String>,
        symbol: impl Into<String>,
        core: Arc<dyn EmulationCore>,
    ) -> SystemDescriptorBuilder {
        SystemDescriptorBuilder {
            name: name.into(),
            manufacturer: manufacturer.into(),
            symbol: symbol.into(),
            core,
            extensions: None,
            multi_file_extensions: Vec::new(),
            dependencies_override: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn supported_extensions(&self) -> &BTreeSet<String> {
        &self.supported_extensions
    }

    pub fn multi_file_extensions(&self) -> &BTreeSet<String> {
        &self.multi_file_extensions
    }

    pub fn dependencies_override(&self) -> bool {
        self.dependencies_override
    }

    pub fn core(&self) -> &Arc<dyn EmulationCore> {
        &self.core
    }

    pub fn file_dependencies(&self) -> &[FileDependency] {
        self.core.file_dependencies()
    }

    /// Whether a normalized extension (e.g. `.cue`) can be loaded
    pub fn supports(&self, extension: &str) -> bool {
        self.supported_extensions.contains(extension)
    }

    /// Extensions offered in the file picker: native ones plus archive containers
    pub fn pick_extensions(&self, archive_extensions: &[String]) -> Vec<String> {
        let mut extensions: Vec<String> = self.supported_extensions.iter().cloned().collect();
        for archive in archive_extensions {
            if !extensions.contains(archive) {
                extensions.push(archive.clone());
            }
        }
        extensions
    }
}

impl fmt::Debug for SystemDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemDescriptor")
            .field("name", &self.name)
            .field("symbol", &self.symbol)
            .field("core", &self.core.name())
            .field("supported_extensions", &self.supported_extensions)
            .field("multi_file_extensions", &self.multi_file_extensions)
            .field("dependencies_override", &self.dependencies_override)
            .finish()
    }
}

impl fmt::Display for SystemDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.manufacturer, self.name)
    }
}

/// Builder validating descriptor invariants
pub struct SystemDescriptorBuilder {
    name: String,
    manufacturer: String,
    symbol: String,
    core: Arc<dyn EmulationCore>,
    extensions: Option<Vec<String>>,
    multi_file_extensions: Vec<String>,
    dependencies_override: bool,
}

impl SystemDescriptorBuilder {
    /// Use these extensions instead of everything the core supports
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    pub fn multi_file_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.multi_file_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn dependencies_override(mut self, value: bool) -> Self {
        self.dependencies_override = value;
        self
    }

    pub fn build(self) -> Result<SystemDescriptor, CatalogError> {
        let raw = self
            .extensions
            .unwrap_or_else(|| self.core.supported_extensions().to_vec());

        let normalize = |raw: &[String]| -> Result<BTreeSet<String>, CatalogError> {
            raw.iter()
                .map(|ext| {
                    normalize_extension(ext).ok_or_else(|| CatalogError::InvalidExtension {
                        system: self.name.clone(),
                        extension: ext.clone(),
                    })
                })
                .collect()
        };

        let supported_extensions = normalize(&raw)?;
        if supported_extensions.is_empty() {
            return Err(CatalogError::NoExtensions {
                system: self.name.clone(),
            });
        }

        let multi_file_extensions = normalize(&self.multi_file_extensions)?;
        if let Some(extension) = multi_file_extensions.difference(&supported_extensions).next() {
            return Err(CatalogError::MultiFileNotSupported {
                system: self.name.clone(),
                extension: extension.clone(),
            });
        }

        Ok(SystemDescriptor {
            name: self.name,
            manufacturer: self.manufacturer,
            symbol: self.symbol,
            supported_extensions,
            multi_file_extensions,
            dependencies_override: self.dependencies_override,
            core: self.core,
        })
    }
}
