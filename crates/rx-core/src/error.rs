//! Error types for the retrox front-end

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the front-end
#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("A session for {0} is still active")]
    SessionActive(String),

    #[error("No system with symbol {0}")]
    UnknownSystem(String),
}

/// Faults reported by an emulation core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Content rejected: {0}")]
    Rejected(String),

    #[error("Core failed to initialize: {0}")]
    InitFailed(String),

    #[error("Core fault: {message}")]
    Fault { message: String, recoverable: bool },

    #[error("Core panicked: {0}")]
    Panicked(String),
}

impl CoreError {
    /// A fault the core can keep running after
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self::Fault {
            message: message.into(),
            recoverable: true,
        }
    }

    /// A fault that leaves the core unable to continue
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fault {
            message: message.into(),
            recoverable: false,
        }
    }

    /// Whether the session has to be torn down after this fault
    pub fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            Self::Fault {
                recoverable: false,
                ..
            } | Self::Panicked(_)
        )
    }
}

/// Storage capability errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid entry name: {0}")]
    InvalidName(String),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while building the system catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("System {system} declares no supported extensions")]
    NoExtensions { system: String },

    #[error("System {system} has malformed extension {extension:?}")]
    InvalidExtension { system: String, extension: String },

    #[error("System {system} lists multi-file extension {extension} that it does not support")]
    MultiFileNotSupported { system: String, extension: String },

    #[error("Duplicate system symbol {0}")]
    DuplicateSymbol(String),

    #[error("System {system} references unknown core {core}")]
    UnknownCore { system: String, core: String },
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type alias for front-end operations
pub type Result<T> = std::result::Result<T, FrontendError>;
