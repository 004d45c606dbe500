//! # Studio Canvas CLI
//!
//! Replay and inspect layered canvas sessions.

use anyhow::Context;
use clap::Parser;
use studio_canvas::{inspect, list_sessions, replay, CliArgs, Command, ReplayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,studio_canvas=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,studio_canvas=debug,studio_canvas_core=info"));

    // Logs go to stderr; stdout carries command output.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    match args.command {
        Command::Replay {
            actions,
            session,
            data_dir,
            config,
            max_history,
            output,
        } => {
            let config = ReplayConfig::resolve(session, data_dir, config.as_deref(), max_history)?;
            let actions_json = std::fs::read_to_string(&actions)
                .with_context(|| format!("Failed to read actions {}", actions.display()))?;

            let document = replay(&config, &actions_json)?;
            if let Some(path) = output {
                std::fs::write(&path, document.to_json()?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!("Wrote canvas document to {}", path.display());
            }

            let summary = studio_canvas_core::CanvasSummary::from(&document.state);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Inspect { document } => {
            let json = std::fs::read_to_string(&document)
                .with_context(|| format!("Failed to read {}", document.display()))?;
            let summary = inspect(&json)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Sessions { data_dir } => {
            for session in list_sessions(&data_dir)? {
                println!("{session}");
            }
        }
    }

    Ok(())
}
