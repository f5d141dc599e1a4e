//! retrox - headless multi-system emulation front-end
//!
//! Opens a game the way "open with" would, runs frames on a fixed tick and
//! takes console commands from stdin.

mod console;

use anyhow::{Context, Result};
use clap::Parser;
use console::Command;
use rx_core::{Config, FrontendError};
use rx_integration::{
    Catalog, EmulationOrchestrator, LogNotifier, ObserverPriority, SessionEvent, SessionSelector,
    StartOutcome,
};
use rx_vfs::{FileHandle, HostStorage, PresetPicker};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "retrox", version, about = "Headless multi-system emulation front-end")]
struct Args {
    /// Game to open
    file: Option<PathBuf>,

    /// System symbol to use when several systems accept the game
    #[arg(short, long)]
    system: Option<String>,

    /// Root folder for multi-file games
    #[arg(short, long)]
    folder: Option<PathBuf>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;
    rx_core::logging::init(config.debug.log_level);

    info!("Starting retrox");

    let selector = build(&config, &args).await.context("failed to set up the front-end")?;
    let orchestrator = selector.orchestrator().clone();

    orchestrator.observers().register(
        ObserverPriority::Presentation,
        Arc::new(|event: &SessionEvent| match event {
            SessionEvent::Started { system, file } => {
                info!("Now playing {} on {}", file.name(), system)
            }
            SessionEvent::Stopped {
                system,
                perform_back_navigation,
            } => {
                if *perform_back_navigation {
                    info!("{} stopped, back to the system list", system)
                } else {
                    info!("{} stopped", system)
                }
            }
            SessionEvent::RuntimeExceptionOccurred(fault) => {
                error!("{} crashed: {}", fault.system, fault.error)
            }
        }),
    );

    if let Some(path) = &args.file {
        open(&selector, FileHandle::new(path), args.system.as_deref()).await;
    }

    run(&selector, args.fps).await?;

    orchestrator.stop(false).await;
    info!("Shutdown complete");
    Ok(())
}

fn load_config(path: Option<&Path>) -> rx_core::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Wire the catalog, orchestrator and selector from `config`
async fn build(config: &Config, args: &Args) -> rx_core::Result<SessionSelector> {
    let catalog = Arc::new(Catalog::from_config(config)?);
    let storage = Arc::new(HostStorage::open(&config.paths.storage).await?);
    let orchestrator = Arc::new(
        EmulationOrchestrator::new()
            .with_start_paused(config.general.start_paused)
            .with_storage(storage.clone()),
    );

    Ok(SessionSelector::new(
        catalog,
        orchestrator,
        storage,
        Arc::new(PresetPicker::new(args.file.clone(), args.folder.clone())),
        Arc::new(LogNotifier),
    ))
}

/// Frame and console loop; returns on `quit`, end of input or Ctrl-C
async fn run(selector: &SessionSelector, fps: u32) -> Result<()> {
    let orchestrator = selector.orchestrator();

    let mut ticker = tokio::time::interval(Duration::from_secs(1) / fps.max(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                orchestrator.run_frame().await;
            }
            line = lines.next_line() => {
                match line.context("failed to read stdin")? {
                    Some(line) => {
                        if !execute(selector, &line).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    Ok(())
}

/// Run one console line; `false` ends the loop
async fn execute(selector: &SessionSelector, line: &str) -> bool {
    let command = match Command::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return true,
        Err(e) => {
            warn!("{:#}", e);
            return true;
        }
    };

    let orchestrator = selector.orchestrator();
    match command {
        Command::Pause => orchestrator.pause().await,
        Command::Resume => orchestrator.resume().await,
        Command::Reset => orchestrator.reset().await,
        Command::Save(slot) => {
            if !orchestrator.save_state(slot).await {
                warn!("Could not save to slot {}", slot);
            }
        }
        Command::Load(slot) => {
            if !orchestrator.load_state(slot).await {
                warn!("Could not load slot {}", slot);
            }
        }
        Command::Press(player, input) => orchestrator.inject_input(player, input),
        Command::Open(path) => open(selector, FileHandle::new(path), None).await,
        Command::Select(symbol) => match selector.catalog().find(&symbol).cloned() {
            Some(system) => report(selector.select_system(&system).await),
            None => warn!("{}", FrontendError::UnknownSystem(symbol)),
        },
        Command::Status => status(selector),
        Command::Stop => orchestrator.stop(true).await,
        Command::Quit => return false,
    }
    true
}

/// Open a game, choosing `system` if several systems accept it
async fn open(selector: &SessionSelector, file: FileHandle, system: Option<&str>) {
    let outcome = selector.open_file(file).await;
    if outcome != StartOutcome::AwaitingDisambiguation {
        report(outcome);
        return;
    }

    match system.and_then(|symbol| selector.catalog().find(symbol)).cloned() {
        Some(system) => report(selector.select_system(&system).await),
        None => warn!(
            "Several systems accept this game ({}); pick one with `select SYSTEM`",
            offered_symbols(selector)
        ),
    }
}

fn report(outcome: StartOutcome) {
    match outcome {
        StartOutcome::Started | StartOutcome::AwaitingDisambiguation => {}
        StartOutcome::Cancelled => info!("Cancelled"),
        other => warn!("Game not started: {:?}", other),
    }
}

fn status(selector: &SessionSelector) {
    match selector.orchestrator().session() {
        Some(session) => {
            info!(
                "{:?}: {} on {}",
                session.phase,
                session.file.name(),
                session.system
            );
            if let Some(saves) = &session.save_folder {
                info!("Saves go to {}", saves);
            }
        }
        None => info!("No active session"),
    }
    info!("Offered systems: {}", offered_symbols(selector));
}

fn offered_symbols(selector: &SessionSelector) -> String {
    selector
        .offered_systems()
        .iter()
        .map(|s| s.symbol())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rx_core::{CatalogError, ConfigError, StorageError};

    fn args() -> Args {
        Args::parse_from(["retrox"])
    }

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.paths.storage = dir.join("storage");
        config
    }

    #[tokio::test]
    async fn test_build_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let selector = build(&config, &args()).await.unwrap();
        assert_eq!(selector.offered_systems().len(), config.systems.len());
        assert!(selector.orchestrator().is_stopped());
        assert!(dir.path().join("storage").is_dir());
    }

    #[tokio::test]
    async fn test_build_rejects_unknown_core() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.systems[0].core = "Missing".to_string();

        let err = build(&config, &args()).await.err().unwrap();
        assert!(matches!(err, FrontendError::Catalog(CatalogError::UnknownCore { .. })));
    }

    #[tokio::test]
    async fn test_build_rejects_file_as_storage() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::write(&config.paths.storage, b"").unwrap();

        let err = build(&config, &args()).await.err().unwrap();
        assert!(matches!(err, FrontendError::Storage(StorageError::NotADirectory(_))));
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        // A missing file is created with defaults
        let config = load_config(Some(&path)).unwrap();
        assert!(path.is_file());
        assert!(!config.systems.is_empty());

        std::fs::write(&path, "[general]\nstart_paused = 3").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, FrontendError::Config(ConfigError::Parse(_))));
    }
}
