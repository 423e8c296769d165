//! Shared mock implementations for integration tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use governor_monitor::{
	models::{EventKind, EventWatcherConfig, LinkConfig, LogEntry},
	services::{
		explorer::{ExplorerError, LogSource},
		notification::{NotificationError, Notifier},
	},
};

/// Log source returning a fixed page on every fetch
pub struct StaticLogSource {
	entries: Vec<LogEntry>,
}

impl StaticLogSource {
	pub fn new(entries: Vec<LogEntry>) -> Self {
		Self { entries }
	}
}

#[async_trait]
impl LogSource for StaticLogSource {
	async fn fetch_logs(
		&self,
		_contract: &str,
		_topic0: &str,
		_from_block: u64,
	) -> Result<Vec<LogEntry>, ExplorerError> {
		Ok(self.entries.clone())
	}
}

/// Notifier that records every message it is asked to deliver
#[derive(Clone, Default)]
pub struct CapturingNotifier {
	messages: Arc<Mutex<Vec<String>>>,
}

impl CapturingNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn messages(&self) -> Vec<String> {
		self.messages.lock().unwrap().clone()
	}
}

#[async_trait]
impl Notifier for CapturingNotifier {
	async fn notify(&self, message: &str) -> Result<(), NotificationError> {
		self.messages.lock().unwrap().push(message.to_string());
		Ok(())
	}
}

/// Left-pads a hex value to one 32-byte word
pub fn word(value: &str) -> String {
	format!("{:0>64}", value)
}

/// Builds a ProposalQueued log entry with the given block number and id
pub fn queued_entry(block: u64, id: u64) -> LogEntry {
	LogEntry {
		block_number: format!("0x{:x}", block),
		transaction_hash: format!("0x{:064x}", id),
		data: format!("0x{}{}", word(&format!("{:x}", id)), word("6553f100")),
		topics: vec![],
	}
}

/// Builds a watcher config for the given kind with a 30s interval
pub fn watcher_config(kind: EventKind, start_block: u64) -> EventWatcherConfig {
	EventWatcherConfig {
		kind,
		contract: format!("0x{}", "a".repeat(40)),
		topic0: format!("0x{}", "b".repeat(64)),
		start_block,
		interval: std::time::Duration::from_secs(30),
	}
}

pub fn link_config() -> LinkConfig {
	LinkConfig {
		explorer_base: "https://etherscan.io".to_string(),
		forum_base: "https://forum.example.org/t".to_string(),
	}
}
