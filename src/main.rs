//! Governance monitoring service entry point.
//!
//! This binary provides the main entry point for the governance event
//! monitoring service. It loads configuration from the environment, sets up
//! one polling watcher per configured event type, and handles graceful
//! shutdown on interrupt signals.
//!
//! # Flow
//! 1. Loads and validates the environment configuration
//! 2. Initializes core services (explorer client, cursor store, notifier)
//! 3. Starts an independently scheduled watcher per event type
//! 4. Polls for new log entries and posts notifications for each new event
//! 5. Handles graceful shutdown on Ctrl+C

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;

use crate::{
	bootstrap::{initialize_services, start_watchers, Result},
	models::{AppConfig, EventKind},
	services::poller::poll_event_logs,
	utils::{logging::setup_logging, parse_string_to_bytes_size},
};

use clap::Parser;
use dotenvy::dotenv_override;
use std::env::{set_var, var};
use tracing::{error, info};

#[derive(Parser)]
#[command(
	name = "governor-monitor",
	about = "A governance monitoring service that polls an explorer's log API for governor \
	         contract events and posts formatted alerts to a Discord channel.",
	version
)]
struct Cli {
	/// Write logs to file instead of stdout
	#[arg(long)]
	log_file: bool,

	/// Set log level (trace, debug, info, warn, error)
	#[arg(long, value_name = "LEVEL")]
	log_level: Option<String>,

	/// Path to store log files (default: logs/)
	#[arg(long, value_name = "PATH")]
	log_path: Option<String>,

	/// Maximum log file size before rolling (e.g., "1GB", "500MB", "1024KB")
	#[arg(long, value_name = "SIZE", value_parser = parse_string_to_bytes_size)]
	log_max_size: Option<u64>,

	/// Run a single poll cycle for one event type and exit
	/// (proposal_created, proposal_queued or tokens_minted)
	#[arg(long, value_name = "EVENT")]
	once: Option<String>,

	/// Validate configuration without starting the service
	#[arg(long)]
	check: bool,
}

impl Cli {
	/// Apply CLI options to environment variables, overriding any existing values
	fn apply_to_env(&self) {
		// Reload environment variables from .env file
		// Override any existing environment variables
		dotenv_override().ok();

		// Log file mode - override if CLI flag is set
		if self.log_file {
			set_var("LOG_MODE", "file");
		}

		// Set log level from RUST_LOG if it exists
		if let Ok(level) = var("RUST_LOG") {
			set_var("LOG_LEVEL", level);
		}

		// Log level - override if CLI flag is set
		if let Some(level) = &self.log_level {
			set_var("LOG_LEVEL", level);
			set_var("RUST_LOG", level);
		}

		// Log path - override if CLI flag is set
		if let Some(path) = &self.log_path {
			set_var("LOG_DATA_DIR", path);
		}

		// Log max size - override if CLI flag is set
		if let Some(max_size) = &self.log_max_size {
			set_var("LOG_MAX_SIZE", max_size.to_string());
		}
	}
}

/// Main entry point for the governance monitoring service.
///
/// # Errors
/// Returns an error if configuration loading fails or if there's an error
/// during startup or shutdown.
#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	// Apply CLI options to environment
	cli.apply_to_env();

	// Setup logging to stdout or file
	setup_logging().unwrap_or_else(|e| {
		error!("Failed to setup logging: {}", e);
	});

	let config = AppConfig::from_env()
		.map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
	config
		.validate()
		.map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

	// If --check flag is provided, only validate configuration and exit
	if cli.check {
		info!(
			"Configuration is valid ({} event watcher(s) configured)",
			config.watchers.len()
		);
		return Ok(());
	}

	let services = initialize_services(&config).await?;

	// If --once is provided, run a single poll cycle for that event type
	if let Some(event) = cli.once {
		let kind: EventKind = event
			.parse()
			.map_err(|e: String| anyhow::anyhow!(e))?;
		let watcher = config.watcher(kind).ok_or_else(|| {
			anyhow::anyhow!("No watcher configured for event type '{}'", kind)
		})?;

		let outcome = poll_event_logs(
			watcher,
			services.log_source.as_ref(),
			services.cursor_store.as_ref(),
			services.notifier.as_ref(),
			&services.links,
		)
		.await
		.map_err(|e| anyhow::anyhow!("Poll cycle failed: {}", e))?;

		info!(
			emitted = outcome.emitted,
			cursor = outcome.cursor,
			"Completed single poll cycle"
		);
		return Ok(());
	}

	let poller = start_watchers(&config, services).await?;
	info!(
		"Watching {} event type(s); press Ctrl+C to stop",
		config.watchers.len()
	);

	tokio::signal::ctrl_c()
		.await
		.map_err(|e| anyhow::anyhow!("Failed to listen for shutdown signal: {}", e))?;

	info!("Shutdown signal received, stopping watchers");
	poller
		.stop_all()
		.await
		.map_err(|e| anyhow::anyhow!("Failed to stop watchers: {}", e))?;
	info!("Shutdown complete");

	Ok(())
}
