//! # impostor-agent
//!
//! Impostor game server binary: loads settings, wires the session registry
//! to the sandbox engine and serves HTTP until Ctrl-C.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use impostor_runtime::{FileExperimentRecorder, GameManager, ManagerOptions, ReadinessOptions};
use impostor_server::{ImpostorServer, ServerConfig};
use impostor_settings::{ImpostorSettings, LogFormat, LogLevel};
use impostor_sim::SandboxFactory;

/// Impostor game server.
#[derive(Parser, Debug)]
#[command(name = "impostor-agent", about = "Impostor game server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Settings file (default `~/.impostor/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error (overrides settings).
    #[arg(long)]
    log_level: Option<String>,
}

/// Load settings from the chosen file and apply CLI overrides.
fn resolve_settings(args: &Cli) -> Result<ImpostorSettings> {
    let path = args
        .settings
        .clone()
        .unwrap_or_else(impostor_settings::settings_path);
    let mut settings = impostor_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;

    if let Some(host) = &args.host {
        settings.server.host.clone_from(host);
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(level) = &args.log_level {
        let Some(parsed) = LogLevel::parse(level) else {
            bail!("Invalid log level: {level}");
        };
        settings.logging.level = parsed;
    }
    Ok(settings)
}

fn init_logging(settings: &ImpostorSettings) {
    let level = settings.logging.level.as_filter_str();
    match settings.logging.format {
        LogFormat::Compact => impostor_core::logging::init_subscriber(level),
        LogFormat::Json => impostor_core::logging::init_json_subscriber(level),
    }
}

/// Registry backed by the sandbox engine, recording experiments if enabled.
fn build_manager(settings: &ImpostorSettings) -> GameManager {
    let game = &settings.game;
    let factory = SandboxFactory::new(Duration::from_millis(game.autonomous_delay_ms));
    let options = ManagerOptions {
        readiness: ReadinessOptions {
            timeout: Duration::from_millis(game.readiness_timeout_ms),
            poll_interval: Duration::from_millis(game.readiness_poll_ms),
        },
    };
    let manager = GameManager::new(Arc::new(factory), options);

    if settings.experiment.enabled {
        let recorder = FileExperimentRecorder::new(&settings.experiment.logs_dir);
        tracing::info!(dir = %recorder.root().display(), "experiment records enabled");
        manager.with_recorder(Arc::new(recorder))
    } else {
        manager
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let settings = resolve_settings(&args)?;
    init_logging(&settings);

    let metrics_handle = impostor_server::metrics::install_recorder()
        .context("Failed to install metrics recorder")?;

    let manager = Arc::new(build_manager(&settings));
    let config = ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
    };
    let server = ImpostorServer::new(config, manager, settings.game.clone(), metrics_handle);

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("Impostor server listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.shutdown().graceful_shutdown(handle).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
