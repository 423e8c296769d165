//! Event poller service implementation.
//!
//! Provides the generic poll cycle — fetch one page of logs for a
//! (contract, topic0) pair, decode entries above the cursor, emit
//! notifications, advance the cursor — and the scheduling service that runs
//! one such cycle per event type on its own fixed interval.

mod cursor;
mod error;

pub use cursor::{CursorStore, FileCursorStore, InMemoryCursorStore};
pub use error::PollerError;

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::instrument;

use crate::{
	models::{EventWatcherConfig, LinkConfig},
	services::{explorer::LogSource, formatter, notification::Notifier},
};

/// Trait for job scheduler
///
/// This trait is used to abstract the job scheduler implementation.
/// It is used to allow the event poller service to be used with different
/// job scheduler implementations.
#[async_trait::async_trait]
pub trait JobSchedulerTrait: Send + Sync + Sized {
	async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>>;
	async fn add(&self, job: Job) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
	async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
	async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Implementation of the job scheduler trait for the JobScheduler struct
#[async_trait::async_trait]
impl JobSchedulerTrait for JobScheduler {
	async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
		Self::new().await.map_err(Into::into)
	}

	async fn add(&self, job: Job) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
		self.add(job).await.map(|_| ()).map_err(Into::into)
	}

	async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
		self.start().await.map(|_| ()).map_err(Into::into)
	}

	async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
		self.shutdown().await.map(|_| ()).map_err(Into::into)
	}
}

/// Shared collaborators injected into every poll cycle.
///
/// Read-only after initialization; cloning shares the underlying services.
#[derive(Clone)]
pub struct PollerServices {
	pub log_source: Arc<dyn LogSource>,
	pub cursor_store: Arc<dyn CursorStore>,
	pub notifier: Arc<dyn Notifier>,
	pub links: LinkConfig,
}

/// Result of one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
	/// Cursor value after the cycle (unchanged if nothing new was seen)
	pub cursor: u64,
	/// Number of notifications successfully emitted
	pub emitted: usize,
}

/// Runs one poll cycle for one event watcher.
///
/// Fetches the first page of logs at or after the current cursor, then for
/// each entry in input order: entries at or below the cycle-start cursor are
/// skipped; newer entries are decoded, rendered and emitted. The cursor is
/// advanced once, to the maximum block number over all returned entries, so
/// a page holding only already-seen blocks leaves it unchanged.
///
/// Failure policy: a fetch failure aborts the cycle with the cursor
/// untouched (the next tick retries); an undecodable entry is skipped and
/// logged but still advances the cursor past its block; a failed delivery
/// drops that one message.
///
/// # Arguments
/// * `watcher` - The (contract, topic0, kind) tuple being polled
/// * `log_source` - Explorer log source
/// * `cursor_store` - Cursor storage for this event type
/// * `notifier` - Delivery channel
/// * `links` - Base URLs for rendered links
///
/// # Returns
/// * `Result<PollOutcome, PollerError>` - Cycle outcome or error
#[instrument(skip_all, fields(event = watcher.kind.id()))]
pub async fn poll_event_logs(
	watcher: &EventWatcherConfig,
	log_source: &dyn LogSource,
	cursor_store: &dyn CursorStore,
	notifier: &dyn Notifier,
	links: &LinkConfig,
) -> Result<PollOutcome, PollerError> {
	let event_id = watcher.kind.id();
	let metadata = HashMap::from([("event".to_string(), event_id.to_string())]);

	let start_cursor = cursor_store
		.get_cursor(event_id)
		.await
		.map_err(|e| {
			PollerError::storage_error(
				"Failed to read cursor",
				Some(e.into()),
				Some(metadata.clone()),
			)
		})?
		.unwrap_or(watcher.start_block);

	let entries = log_source
		.fetch_logs(&watcher.contract, &watcher.topic0, start_cursor)
		.await
		.map_err(|e| {
			PollerError::fetch_error(
				"Failed to fetch logs",
				Some(e.into()),
				Some(metadata.clone()),
			)
		})?;

	tracing::debug!(
		entries = entries.len(),
		cursor = start_cursor,
		"Fetched log page"
	);

	let mut max_seen = start_cursor;
	let mut emitted = 0usize;

	for entry in &entries {
		let block_number = match entry.parsed_block_number() {
			Ok(block) => block,
			Err(e) => {
				tracing::warn!(
					tx = %entry.transaction_hash,
					error = %e,
					"Skipping entry with unparseable block number"
				);
				continue;
			}
		};

		// Entries may arrive out of order; track the page-wide maximum
		if block_number > max_seen {
			max_seen = block_number;
		}

		if block_number <= start_cursor {
			tracing::trace!(block = block_number, "Entry already processed");
			continue;
		}

		let decoded = match watcher.kind.decode(entry) {
			Ok(decoded) => decoded,
			Err(e) => {
				tracing::warn!(
					tx = %entry.transaction_hash,
					block = block_number,
					error = %e,
					"Skipping undecodable entry"
				);
				continue;
			}
		};

		let message = formatter::render_event(&decoded, entry, block_number, links);
		match notifier.notify(&message).await {
			Ok(()) => emitted += 1,
			Err(e) => {
				tracing::error!(
					tx = %entry.transaction_hash,
					block = block_number,
					error = %e,
					"Dropped notification after failed delivery"
				);
			}
		}
	}

	if max_seen > start_cursor {
		cursor_store.set_cursor(event_id, max_seen).await.map_err(|e| {
			PollerError::storage_error(
				"Failed to advance cursor",
				Some(e.into()),
				Some(metadata),
			)
		})?;
		tracing::info!(from = start_cursor, to = max_seen, "Cursor advanced");
	}

	Ok(PollOutcome {
		cursor: max_seen,
		emitted,
	})
}

/// Watcher implementation for a single event type
///
/// Owns the scheduler that drives the poll cycle for one
/// (contract, topic0, kind) tuple at its configured interval.
///
/// # Type Parameters
/// * `J` - Job scheduler implementation (must implement JobSchedulerTrait)
pub struct EventWatcher<J>
where
	J: JobSchedulerTrait,
{
	pub config: EventWatcherConfig,
	pub scheduler: J,
}

impl<J> EventWatcher<J>
where
	J: JobSchedulerTrait,
{
	/// Creates a new event watcher instance
	///
	/// # Arguments
	/// * `config` - Watcher configuration
	///
	/// # Returns
	/// * `Result<Self, PollerError>` - New watcher instance or error
	pub async fn new(config: EventWatcherConfig) -> Result<Self, PollerError> {
		let scheduler = J::new().await.map_err(|e| {
			PollerError::scheduler_error(
				e.to_string(),
				Some(e),
				Some(HashMap::from([(
					"event".to_string(),
					config.kind.id().to_string(),
				)])),
			)
		})?;
		Ok(Self { config, scheduler })
	}

	/// Starts the event watcher
	///
	/// Registers a repeated job at the watcher's interval and starts the
	/// scheduler. Cycles are not reentrant for a given event type; a failed
	/// cycle only logs and waits for the next tick.
	pub async fn start(&mut self, services: PollerServices) -> Result<(), PollerError> {
		let config = self.config.clone();
		let metadata = HashMap::from([(
			"event".to_string(),
			self.config.kind.id().to_string(),
		)]);

		let job = Job::new_repeated_async(self.config.interval, move |_uuid, _l| {
			let config = config.clone();
			let services = services.clone();
			Box::pin(async move {
				let result = poll_event_logs(
					&config,
					services.log_source.as_ref(),
					services.cursor_store.as_ref(),
					services.notifier.as_ref(),
					&services.links,
				)
				.await;
				if let Err(e) = result {
					tracing::error!(
						event = config.kind.id(),
						error = %e,
						"Poll cycle failed; retrying on the next tick"
					);
				}
			})
		})
		.map_err(|e| {
			PollerError::scheduler_error(
				"Failed to create job",
				Some(e.into()),
				Some(metadata.clone()),
			)
		})?;

		self.scheduler.add(job).await.map_err(|e| {
			PollerError::scheduler_error(e.to_string(), Some(e), Some(metadata.clone()))
		})?;

		self.scheduler.start().await.map_err(|e| {
			PollerError::scheduler_error(e.to_string(), Some(e), Some(metadata))
		})?;

		tracing::info!(
			event = self.config.kind.id(),
			interval_secs = self.config.interval.as_secs(),
			"Started event watcher"
		);
		Ok(())
	}

	/// Stops the event watcher
	///
	/// Shuts down the scheduler and stops polling for this event type.
	pub async fn stop(&mut self) -> Result<(), PollerError> {
		self.scheduler.shutdown().await.map_err(|e| {
			PollerError::scheduler_error(
				e.to_string(),
				Some(e),
				Some(HashMap::from([(
					"event".to_string(),
					self.config.kind.id().to_string(),
				)])),
			)
		})?;

		tracing::info!(event = self.config.kind.id(), "Stopped event watcher");
		Ok(())
	}
}

/// Map of active event watchers keyed by event id
type EventWatchersMap<J> = HashMap<String, EventWatcher<J>>;

/// Service for managing the event watchers
///
/// Coordinates polling across event types, managing individual watchers and
/// their lifecycles. Distinct event types run concurrently on the shared
/// runtime; the only state they share is the injected services bundle.
///
/// # Type Parameters
/// * `J` - Job scheduler implementation (must implement JobSchedulerTrait)
pub struct EventPollerService<J>
where
	J: JobSchedulerTrait,
{
	services: PollerServices,
	active_watchers: Arc<RwLock<EventWatchersMap<J>>>,
}

impl<J> EventPollerService<J>
where
	J: JobSchedulerTrait,
{
	/// Creates a new event poller service
	///
	/// # Arguments
	/// * `services` - Shared collaborators injected into every poll cycle
	pub fn new(services: PollerServices) -> Self {
		EventPollerService {
			services,
			active_watchers: Arc::new(RwLock::new(HashMap::new())),
		}
	}

	/// Starts a watcher for a specific event type
	///
	/// # Arguments
	/// * `config` - Watcher configuration to start
	pub async fn start_event_watcher(
		&self,
		config: &EventWatcherConfig,
	) -> Result<(), PollerError> {
		let mut watchers = self.active_watchers.write().await;
		let event_id = config.kind.id().to_string();

		if watchers.contains_key(&event_id) {
			tracing::info!(event = %event_id, "Event watcher already running");
			return Ok(());
		}

		let mut watcher = EventWatcher::new(config.clone()).await?;
		watcher.start(self.services.clone()).await?;
		watchers.insert(event_id, watcher);

		Ok(())
	}

	/// Stops the watcher for a specific event type
	///
	/// # Arguments
	/// * `event_id` - Identifier of the event type to stop watching
	pub async fn stop_event_watcher(&self, event_id: &str) -> Result<(), PollerError> {
		let mut watchers = self.active_watchers.write().await;

		if let Some(mut watcher) = watchers.remove(event_id) {
			watcher.stop().await?;
		}

		Ok(())
	}

	/// Stops all active watchers
	pub async fn stop_all(&self) -> Result<(), PollerError> {
		let mut watchers = self.active_watchers.write().await;

		for (_, mut watcher) in watchers.drain() {
			watcher.stop().await?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		models::{EventKind, LogEntry},
		services::{explorer::ExplorerError, notification::NotificationError},
	};
	use async_trait::async_trait;
	use std::{sync::Mutex, time::Duration};

	struct FakeLogSource {
		entries: Vec<LogEntry>,
		fail: bool,
	}

	#[async_trait]
	impl LogSource for FakeLogSource {
		async fn fetch_logs(
			&self,
			_contract: &str,
			_topic0: &str,
			_from_block: u64,
		) -> Result<Vec<LogEntry>, ExplorerError> {
			if self.fail {
				return Err(ExplorerError::response_error(
					"Explorer request failed with status: 502",
					None,
					None,
				));
			}
			Ok(self.entries.clone())
		}
	}

	#[derive(Default)]
	struct CapturingNotifier {
		messages: Mutex<Vec<String>>,
	}

	#[async_trait]
	impl Notifier for CapturingNotifier {
		async fn notify(&self, message: &str) -> Result<(), NotificationError> {
			self.messages.lock().unwrap().push(message.to_string());
			Ok(())
		}
	}

	struct FailingNotifier;

	#[async_trait]
	impl Notifier for FailingNotifier {
		async fn notify(&self, _message: &str) -> Result<(), NotificationError> {
			Err(NotificationError::notify_failed(
				"Discord request failed with status: 403",
				None,
				None,
			))
		}
	}

	fn word(value: &str) -> String {
		format!("{:0>64}", value)
	}

	/// ProposalQueued payload: (id, eta)
	fn queued_data(id: u64) -> String {
		format!("0x{}{}", word(&format!("{:x}", id)), word("6553f100"))
	}

	fn queued_entry(block: u64, id: u64) -> LogEntry {
		LogEntry {
			block_number: format!("0x{:x}", block),
			transaction_hash: format!("0xtx{}", id),
			data: queued_data(id),
			topics: vec![],
		}
	}

	fn test_watcher() -> EventWatcherConfig {
		EventWatcherConfig {
			kind: EventKind::ProposalQueued,
			contract: format!("0x{}", "a".repeat(40)),
			topic0: format!("0x{}", "b".repeat(64)),
			start_block: 90,
			interval: Duration::from_secs(30),
		}
	}

	fn test_links() -> LinkConfig {
		LinkConfig {
			explorer_base: "https://etherscan.io".to_string(),
			forum_base: "https://forum.example.org/t".to_string(),
		}
	}

	#[tokio::test]
	async fn test_poll_emits_new_entries_and_advances_cursor_to_page_maximum() {
		// Page arrives out of order: [100, 105, 103]
		let source = FakeLogSource {
			entries: vec![
				queued_entry(100, 1),
				queued_entry(105, 2),
				queued_entry(103, 3),
			],
			fail: false,
		};
		let store = InMemoryCursorStore::new();
		let notifier = CapturingNotifier::default();

		let outcome = poll_event_logs(&test_watcher(), &source, &store, &notifier, &test_links())
			.await
			.unwrap();

		assert_eq!(outcome.emitted, 3);
		assert_eq!(outcome.cursor, 105);
		assert_eq!(store.get_cursor("proposal_queued").await.unwrap(), Some(105));

		// Emission follows input order and carries each entry's own data
		let messages = notifier.messages.lock().unwrap();
		assert_eq!(messages.len(), 3);
		assert!(messages[0].contains("**Proposal Id:** 1"));
		assert!(messages[0].contains("block/100"));
		assert!(messages[1].contains("**Proposal Id:** 2"));
		assert!(messages[1].contains("block/105"));
		assert!(messages[2].contains("**Proposal Id:** 3"));
		assert!(messages[2].contains("block/103"));
	}

	#[tokio::test]
	async fn test_poll_skips_entries_at_or_below_cursor() {
		let source = FakeLogSource {
			entries: vec![queued_entry(100, 1), queued_entry(105, 2)],
			fail: false,
		};
		let store = InMemoryCursorStore::new();
		store.set_cursor("proposal_queued", 105).await.unwrap();
		let notifier = CapturingNotifier::default();

		let outcome = poll_event_logs(&test_watcher(), &source, &store, &notifier, &test_links())
			.await
			.unwrap();

		assert_eq!(outcome.emitted, 0);
		assert_eq!(outcome.cursor, 105);
		assert_eq!(store.get_cursor("proposal_queued").await.unwrap(), Some(105));
		assert!(notifier.messages.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_poll_replaying_same_page_is_idempotent() {
		let source = FakeLogSource {
			entries: vec![queued_entry(100, 1), queued_entry(105, 2)],
			fail: false,
		};
		let store = InMemoryCursorStore::new();
		let notifier = CapturingNotifier::default();
		let watcher = test_watcher();
		let links = test_links();

		let first = poll_event_logs(&watcher, &source, &store, &notifier, &links)
			.await
			.unwrap();
		assert_eq!(first.emitted, 2);

		// The same page again: the advanced cursor filters everything out
		let second = poll_event_logs(&watcher, &source, &store, &notifier, &links)
			.await
			.unwrap();
		assert_eq!(second.emitted, 0);
		assert_eq!(second.cursor, 105);
		assert_eq!(notifier.messages.lock().unwrap().len(), 2);
	}

	#[tokio::test]
	async fn test_poll_fetch_failure_aborts_cycle_and_keeps_cursor() {
		let source = FakeLogSource {
			entries: vec![],
			fail: true,
		};
		let store = InMemoryCursorStore::new();
		store.set_cursor("proposal_queued", 99).await.unwrap();
		let notifier = CapturingNotifier::default();

		let result =
			poll_event_logs(&test_watcher(), &source, &store, &notifier, &test_links()).await;

		assert!(matches!(result.unwrap_err(), PollerError::FetchError(_)));
		assert_eq!(store.get_cursor("proposal_queued").await.unwrap(), Some(99));
		assert!(notifier.messages.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_poll_skips_undecodable_entry_but_still_advances_cursor() {
		let mut malformed = queued_entry(105, 2);
		// Truncated payload: one word where the schema needs two
		malformed.data = format!("0x{}", word("2"));

		let source = FakeLogSource {
			entries: vec![queued_entry(100, 1), malformed],
			fail: false,
		};
		let store = InMemoryCursorStore::new();
		let notifier = CapturingNotifier::default();

		let outcome = poll_event_logs(&test_watcher(), &source, &store, &notifier, &test_links())
			.await
			.unwrap();

		assert_eq!(outcome.emitted, 1);
		assert_eq!(outcome.cursor, 105);
		assert_eq!(store.get_cursor("proposal_queued").await.unwrap(), Some(105));
	}

	#[tokio::test]
	async fn test_poll_delivery_failure_drops_message_and_advances_cursor() {
		let source = FakeLogSource {
			entries: vec![queued_entry(100, 1)],
			fail: false,
		};
		let store = InMemoryCursorStore::new();

		let outcome = poll_event_logs(
			&test_watcher(),
			&source,
			&store,
			&FailingNotifier,
			&test_links(),
		)
		.await
		.unwrap();

		assert_eq!(outcome.emitted, 0);
		assert_eq!(store.get_cursor("proposal_queued").await.unwrap(), Some(100));
	}

	#[tokio::test]
	async fn test_poll_empty_page_leaves_cursor_unchanged() {
		let source = FakeLogSource {
			entries: vec![],
			fail: false,
		};
		let store = InMemoryCursorStore::new();
		let notifier = CapturingNotifier::default();

		let outcome = poll_event_logs(&test_watcher(), &source, &store, &notifier, &test_links())
			.await
			.unwrap();

		// No stored cursor and nothing fetched: the configured start block holds
		assert_eq!(outcome.cursor, 90);
		assert_eq!(outcome.emitted, 0);
		assert_eq!(store.get_cursor("proposal_queued").await.unwrap(), None);
	}
}
