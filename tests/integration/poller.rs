//! Scheduled watcher lifecycle tests.
//!
//! Runs the real scheduler with a short interval against in-memory fakes and
//! checks that cycles fire, that replays stay idempotent across ticks, and
//! that watchers stop cleanly.

use std::{sync::Arc, time::Duration};
use tokio_cron_scheduler::JobScheduler;

use governor_monitor::{
	models::EventKind,
	services::poller::{
		CursorStore, EventPollerService, InMemoryCursorStore, PollerServices,
	},
};

use super::mocks::{link_config, queued_entry, watcher_config, CapturingNotifier, StaticLogSource};

fn services(
	entries: Vec<governor_monitor::models::LogEntry>,
	notifier: CapturingNotifier,
	cursor_store: Arc<InMemoryCursorStore>,
) -> PollerServices {
	PollerServices {
		log_source: Arc::new(StaticLogSource::new(entries)),
		cursor_store,
		notifier: Arc::new(notifier),
		links: link_config(),
	}
}

#[tokio::test]
async fn test_watcher_fires_on_interval_and_stays_idempotent() {
	let notifier = CapturingNotifier::new();
	let cursor_store = Arc::new(InMemoryCursorStore::new());
	let entries = vec![queued_entry(100, 1), queued_entry(105, 2)];

	let poller = EventPollerService::<JobScheduler>::new(services(
		entries,
		notifier.clone(),
		cursor_store.clone(),
	));

	let mut config = watcher_config(EventKind::ProposalQueued, 90);
	config.interval = Duration::from_secs(1);

	poller.start_event_watcher(&config).await.unwrap();

	// Enough time for at least two ticks
	tokio::time::sleep(Duration::from_millis(2_500)).await;

	poller.stop_all().await.unwrap();

	// The first cycle emits both entries; later cycles see an advanced
	// cursor and emit nothing, however many ticks actually fired
	let messages = notifier.messages();
	assert_eq!(messages.len(), 2);
	assert!(messages[0].contains("**Proposal Id:** 1"));
	assert!(messages[1].contains("**Proposal Id:** 2"));
	assert_eq!(
		cursor_store.get_cursor("proposal_queued").await.unwrap(),
		Some(105)
	);
}

#[tokio::test]
async fn test_starting_same_event_twice_is_a_no_op() {
	let notifier = CapturingNotifier::new();
	let cursor_store = Arc::new(InMemoryCursorStore::new());

	let poller = EventPollerService::<JobScheduler>::new(services(
		vec![],
		notifier.clone(),
		cursor_store,
	));

	let config = watcher_config(EventKind::ProposalQueued, 0);
	poller.start_event_watcher(&config).await.unwrap();
	// Second start for the same event type must not error or double-schedule
	poller.start_event_watcher(&config).await.unwrap();

	poller.stop_event_watcher("proposal_queued").await.unwrap();
	// Stopping an already-stopped watcher is also a no-op
	poller.stop_event_watcher("proposal_queued").await.unwrap();
}

#[tokio::test]
async fn test_event_types_keep_independent_cursors() {
	let notifier = CapturingNotifier::new();
	let cursor_store = Arc::new(InMemoryCursorStore::new());
	let entries = vec![queued_entry(100, 1)];

	let poller = EventPollerService::<JobScheduler>::new(services(
		entries,
		notifier.clone(),
		cursor_store.clone(),
	));

	let mut queued = watcher_config(EventKind::ProposalQueued, 90);
	queued.interval = Duration::from_secs(1);

	poller.start_event_watcher(&queued).await.unwrap();

	tokio::time::sleep(Duration::from_millis(1_500)).await;
	poller.stop_all().await.unwrap();

	// Each event type keeps its own cursor
	assert_eq!(
		cursor_store.get_cursor("proposal_queued").await.unwrap(),
		Some(100)
	);
	assert_eq!(
		cursor_store.get_cursor("proposal_created").await.unwrap(),
		None
	);
}
