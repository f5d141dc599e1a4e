//! Configuration system for the retrox front-end

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub paths: PathConfig,
    pub debug: DebugConfig,
    pub cores: Vec<CoreConfig>,
    pub systems: Vec<SystemConfig>,
}

/// General front-end settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Container formats offered in the file picker next to native extensions
    pub archive_extensions: Vec<String>,
    /// Pause the session right after it starts
    pub start_paused: bool,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Root of the per-core system directories
    pub storage: PathBuf,
}

/// Debug settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Emulation core implementation backing a core entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CoreKind {
    /// Validates content and keeps session bookkeeping without emulating
    #[default]
    Null,
}

/// A firmware or BIOS file a core needs in its system directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// An emulation core and what it can load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    pub name: String,
    #[serde(default)]
    pub kind: CoreKind,
    pub extensions: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencyConfig>,
}

/// A system offered to the user, backed by one of the configured cores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub name: String,
    pub manufacturer: String,
    pub symbol: String,
    /// Name of the entry in `cores`
    pub core: String,
    /// Restricts the extensions taken from the core
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    /// Extensions whose games span several files and need a root folder
    #[serde(default)]
    pub multi_file_extensions: Vec<String>,
    /// Skip the dependency check for this system
    #[serde(default)]
    pub dependencies_override: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            archive_extensions: vec![".zip".to_string()],
            start_paused: false,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("retrox");

        Self { storage: base }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn core(name: &str, extensions: &[&str], dependencies: &[(&str, &str)]) -> CoreConfig {
    CoreConfig {
        name: name.to_string(),
        kind: CoreKind::Null,
        extensions: strings(extensions),
        dependencies: dependencies
            .iter()
            .map(|(name, description)| DependencyConfig {
                name: name.to_string(),
                description: description.to_string(),
            })
            .collect(),
    }
}

fn system(
    name: &str,
    manufacturer: &str,
    symbol: &str,
    core: &str,
    extensions: Option<&[&str]>,
    multi_file_extensions: &[&str],
    dependencies_override: bool,
) -> SystemConfig {
    SystemConfig {
        name: name.to_string(),
        manufacturer: manufacturer.to_string(),
        symbol: symbol.to_string(),
        core: core.to_string(),
        extensions: extensions.map(strings),
        multi_file_extensions: strings(multi_file_extensions),
        dependencies_override,
    }
}

impl Default for Config {
    fn default() -> Self {
        let cores = vec![
            core("FCEUmm", &[".nes", ".fds", ".unf", ".unif"], &[("disksys.rom", "Famicom Disk System BIOS")]),
            core("Snes9x", &[".sfc", ".smc"], &[]),
            core("Gambatte", &[".gb", ".gbc"], &[]),
            core("VBA-M", &[".gba"], &[("gba_bios.bin", "Game Boy Advance BIOS")]),
            core(
                "Genesis Plus GX",
                &[".md", ".gen", ".smd", ".bin", ".sms", ".gg", ".cue", ".iso"],
                &[
                    ("bios_CD_E.bin", "Mega-CD (Europe) BIOS"),
                    ("bios_CD_U.bin", "Sega CD (USA) BIOS"),
                    ("bios_CD_J.bin", "Mega-CD (Japan) BIOS"),
                ],
            ),
            core(
                "Beetle PSX",
                &[".cue", ".pbp"],
                &[
                    ("scph5500.bin", "PlayStation (Japan) BIOS"),
                    ("scph5501.bin", "PlayStation (USA) BIOS"),
                    ("scph5502.bin", "PlayStation (Europe) BIOS"),
                ],
            ),
            core("Beetle PCE Fast", &[".pce", ".cue"], &[("syscard3.pce", "PC Engine CD System Card 3")]),
        ];

        let systems = vec![
            system("NES", "Nintendo", "nes", "FCEUmm", None, &[], true),
            system("SNES", "Nintendo", "snes", "Snes9x", None, &[], false),
            system("Game Boy", "Nintendo", "gb", "Gambatte", Some(&[".gb"]), &[], false),
            system("Game Boy Color", "Nintendo", "gbc", "Gambatte", Some(&[".gbc"]), &[], false),
            system("Game Boy Advance", "Nintendo", "gba", "VBA-M", None, &[], true),
            system("Master System", "Sega", "sms", "Genesis Plus GX", Some(&[".sms"]), &[], true),
            system("Game Gear", "Sega", "gg", "Genesis Plus GX", Some(&[".gg"]), &[], true),
            system(
                "Mega Drive",
                "Sega",
                "md",
                "Genesis Plus GX",
                Some(&[".md", ".gen", ".smd", ".bin"]),
                &[],
                true,
            ),
            system("Mega CD", "Sega", "mcd", "Genesis Plus GX", Some(&[".cue", ".iso"]), &[".cue"], false),
            system("PlayStation", "Sony", "psx", "Beetle PSX", None, &[".cue"], false),
            system("PC Engine", "NEC", "pce", "Beetle PCE Fast", Some(&[".pce"]), &[], true),
            system("PC Engine CD", "NEC", "pcecd", "Beetle PCE Fast", Some(&[".cue"]), &[".cue"], false),
        ];

        Self {
            general: GeneralConfig::default(),
            paths: PathConfig::default(),
            debug: DebugConfig::default(),
            cores,
            systems,
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific path, writing defaults there if it is missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("retrox")
            .join("config.toml")
    }
}
