//! Bootstraps the application.
//!
//! Builds the service graph from the validated configuration: the explorer
//! client, the configured cursor store, the Discord notifier, and the poller
//! service that schedules one watcher per configured event type.

use std::sync::Arc;
use tokio_cron_scheduler::JobScheduler;

use crate::{
	models::{AppConfig, CursorStoreKind},
	services::{
		explorer::EtherscanClient,
		notification::{DiscordNotifier, NotificationError},
		poller::{
			CursorStore, EventPollerService, FileCursorStore, InMemoryCursorStore, PollerError,
			PollerServices,
		},
	},
};

/// Result type for bootstrap operations
pub type Result<T> = anyhow::Result<T>;

/// Builds the shared service bundle from the configuration.
///
/// The returned [`PollerServices`] is read-only after initialization and is
/// cloned into every scheduled poll cycle.
///
/// # Arguments
/// * `config` - Validated application configuration
///
/// # Returns
/// * `Result<PollerServices>` - The service bundle or an initialization error
pub async fn initialize_services(config: &AppConfig) -> Result<PollerServices> {
	let log_source = Arc::new(EtherscanClient::new(&config.explorer));

	let cursor_store: Arc<dyn CursorStore> = match config.cursor_store.kind {
		CursorStoreKind::Memory => Arc::new(InMemoryCursorStore::new()),
		CursorStoreKind::File => {
			tokio::fs::create_dir_all(&config.cursor_store.data_dir)
				.await
				.map_err(|e| {
					anyhow::anyhow!(
						"Failed to create cursor data directory {}: {}",
						config.cursor_store.data_dir.display(),
						e
					)
				})?;
			Arc::new(FileCursorStore::new(config.cursor_store.data_dir.clone()))
		}
	};

	let notifier = Arc::new(
		DiscordNotifier::new(&config.discord)
			.map_err(|e: NotificationError| anyhow::anyhow!("Failed to build notifier: {}", e))?,
	);

	Ok(PollerServices {
		log_source,
		cursor_store,
		notifier,
		links: config.links.clone(),
	})
}

/// Starts one watcher per configured event type.
///
/// # Arguments
/// * `config` - Validated application configuration
/// * `services` - Shared service bundle from [`initialize_services`]
///
/// # Returns
/// * `Result<EventPollerService<JobScheduler>>` - The running poller service
pub async fn start_watchers(
	config: &AppConfig,
	services: PollerServices,
) -> Result<EventPollerService<JobScheduler>> {
	let poller = EventPollerService::<JobScheduler>::new(services);

	for watcher in &config.watchers {
		poller
			.start_event_watcher(watcher)
			.await
			.map_err(|e: PollerError| {
				anyhow::anyhow!("Failed to start watcher for {}: {}", watcher.kind, e)
			})?;
	}

	Ok(poller)
}
