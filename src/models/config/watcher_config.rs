//! Per-event-type watcher configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{config::error::ConfigError, event::EventKind};

/// Configuration of one polling watcher: a (contract, topic0, kind) tuple
/// with its own cursor start and poll interval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventWatcherConfig {
	/// Which event schema and notification format this watcher uses
	pub kind: EventKind,

	/// Contract address emitting the event
	pub contract: String,

	/// Event topic signature (topic0) selecting the event type
	pub topic0: String,

	/// Initial cursor value: only blocks strictly above this are processed
	pub start_block: u64,

	/// Fixed wall-clock interval between poll cycles
	pub interval: Duration,
}

impl EventWatcherConfig {
	/// Validates the watcher configuration.
	///
	/// Returns Ok(()) if valid, or an error message if invalid.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !is_hex_address(&self.contract) {
			return Err(ConfigError::validation_error(
				format!(
					"Watcher '{}': contract '{}' is not a 0x-prefixed 20-byte hex address",
					self.kind, self.contract
				),
				None,
				None,
			));
		}

		if !is_topic_hash(&self.topic0) {
			return Err(ConfigError::validation_error(
				format!(
					"Watcher '{}': topic0 '{}' is not a 0x-prefixed 32-byte hex hash",
					self.kind, self.topic0
				),
				None,
				None,
			));
		}

		if self.interval < Duration::from_secs(1) {
			return Err(ConfigError::validation_error(
				format!("Watcher '{}': poll interval must be at least 1 second", self.kind),
				None,
				None,
			));
		}

		Ok(())
	}
}

/// Checks for a 0x-prefixed 40-hex-digit address
pub fn is_hex_address(value: &str) -> bool {
	match value.strip_prefix("0x") {
		Some(digits) => digits.len() == 40 && digits.chars().all(|c| c.is_ascii_hexdigit()),
		None => false,
	}
}

/// Checks for a 0x-prefixed 64-hex-digit topic hash
pub fn is_topic_hash(value: &str) -> bool {
	match value.strip_prefix("0x") {
		Some(digits) => digits.len() == 64 && digits.chars().all(|c| c.is_ascii_hexdigit()),
		None => false,
	}
}
