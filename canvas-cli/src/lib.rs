//! # Studio Canvas CLI
//!
//! Replays recorded canvas actions against a session and inspects saved
//! canvas documents.
//!
//! ## Usage
//!
//! ```bash
//! studio-canvas replay actions.json --data-dir ./sessions --session default
//! studio-canvas inspect ./sessions/default.json
//! studio-canvas sessions --data-dir ./sessions
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ReplayConfig` - Resolved canvas configuration and storage location
//! - `replay` / `inspect` / `list_sessions` - one function per subcommand

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use studio_canvas_core::{CanvasAction, CanvasConfig, CanvasDocument, CanvasStore, CanvasSummary};

/// Command-line arguments for studio-canvas.
#[derive(Debug, Clone, Parser)]
#[command(name = "studio-canvas")]
#[command(about = "Replay and inspect layered canvas sessions")]
#[command(version)]
pub struct CliArgs {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Apply a JSON list of actions to a session and print its summary
    Replay {
        /// JSON file containing an array of actions
        actions: PathBuf,

        /// Session to apply the actions to
        #[arg(long, env = "CANVAS_SESSION_ID", default_value = "default")]
        session: String,

        /// Directory holding persisted sessions
        #[arg(long, env = "CANVAS_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// JSON canvas configuration file
        #[arg(long, env = "CANVAS_CONFIG")]
        config: Option<PathBuf>,

        /// Snapshots kept on each history stack (overrides the config file)
        #[arg(long, env = "CANVAS_MAX_HISTORY")]
        max_history: Option<usize>,

        /// Write the resulting canvas document here
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the summary of a saved canvas document
    Inspect {
        /// Canvas document JSON file
        document: PathBuf,
    },
    /// List sessions persisted in a data directory
    Sessions {
        /// Directory holding persisted sessions
        #[arg(long, env = "CANVAS_DATA_DIR")]
        data_dir: PathBuf,
    },
}

/// Resolved settings for a replay.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Session to apply actions to.
    pub session: String,
    /// Where sessions are persisted, if anywhere.
    pub data_dir: Option<PathBuf>,
    /// Configuration for new sessions.
    pub canvas: CanvasConfig,
    /// History bound forced onto resumed sessions as well as new ones.
    pub max_history_override: Option<usize>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            session: studio_canvas_core::store::DEFAULT_SESSION.to_string(),
            data_dir: None,
            canvas: CanvasConfig::default(),
            max_history_override: None,
        }
    }
}

impl ReplayConfig {
    /// Build from replay flags, reading the config file if one was given.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file can't be read or is invalid.
    pub fn resolve(
        session: String,
        data_dir: Option<PathBuf>,
        config_path: Option<&Path>,
        max_history: Option<usize>,
    ) -> anyhow::Result<Self> {
        let mut canvas = match config_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                CanvasConfig::from_json(&json)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => CanvasConfig::default(),
        };
        if let Some(max_history) = max_history {
            canvas.max_history = max_history;
        }
        Ok(Self {
            session,
            data_dir,
            canvas,
            max_history_override: max_history,
        })
    }
}

/// Replay a list of actions and return the resulting document.
///
/// When a data directory is configured, a previously persisted session is
/// loaded first and the result is written back. A `max_history_override`
/// replaces the bound the resumed session was saved with.
///
/// # Errors
///
/// Returns an error if the actions can't be parsed or the store can't be
/// opened.
pub fn replay(config: &ReplayConfig, actions_json: &str) -> anyhow::Result<CanvasDocument> {
    let actions =
        CanvasAction::list_from_json(actions_json).context("Failed to parse action list")?;

    let mut store = CanvasStore::with_config(config.canvas.clone());
    if let Some(ref data_dir) = config.data_dir {
        store = store
            .with_data_dir(data_dir)
            .with_context(|| format!("Failed to open data dir {}", data_dir.display()))?;
        let persisted = store.persisted_sessions()?;
        if persisted.contains(&config.session) {
            store.load_session_from_disk(&config.session)?;
            tracing::info!("Resumed session {}", config.session);
            if let Some(max_history) = config.max_history_override {
                store.update(&config.session, |state| state.set_max_history(max_history))?;
            }
        }
    }

    tracing::info!(
        "Replaying {} actions on session {}",
        actions.len(),
        config.session
    );
    let summary = store.dispatch_all(&config.session, actions)?;
    tracing::debug!(?summary, "Replay finished");

    store
        .document(&config.session)
        .context("Session disappeared during replay")
}

/// Summarize a saved document.
///
/// # Errors
///
/// Returns an error if the JSON is not a canvas document.
pub fn inspect(document_json: &str) -> anyhow::Result<CanvasSummary> {
    let document =
        CanvasDocument::from_json(document_json).context("Failed to parse canvas document")?;
    Ok(CanvasSummary::from(&document.state))
}

/// List sessions persisted in `data_dir`.
///
/// # Errors
///
/// Returns an error if the directory can't be read.
pub fn list_sessions(data_dir: &Path) -> anyhow::Result<Vec<String>> {
    let store = CanvasStore::new().with_data_dir(data_dir)?;
    Ok(store.persisted_sessions()?)
}
