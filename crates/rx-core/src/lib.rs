//! Core types for the retrox emulation front-end
//!
//! This crate provides the foundational error types, configuration,
//! and logging infrastructure shared by the other retrox crates.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, CoreConfig, CoreKind, DependencyConfig, LogLevel, SystemConfig};
pub use error::{CatalogError, ConfigError, CoreError, FrontendError, Result, StorageError};
