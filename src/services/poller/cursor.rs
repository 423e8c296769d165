//! Cursor storage implementations for the event poller service.
//!
//! A cursor is the block number up to which one event type has been
//! processed. This module provides the storage interface and two
//! implementations:
//! - In-memory storage (the default; progress is lost on restart)
//! - File-based storage with one cursor file per event type

use async_trait::async_trait;
use std::{collections::HashMap, path::PathBuf};
use tokio::sync::RwLock;

/// Interface for cursor storage implementations.
///
/// Defines the required functionality for reading and advancing the
/// processing cursor of each event type. Implementations must be safe to
/// share across concurrently scheduled watchers.
#[async_trait]
pub trait CursorStore: Send + Sync {
	/// Retrieves the stored cursor for an event type
	///
	/// # Arguments
	/// * `event_id` - Unique identifier for the event type
	///
	/// # Returns
	/// * `Result<Option<u64>, anyhow::Error>` - Stored cursor or None if not found
	async fn get_cursor(&self, event_id: &str) -> Result<Option<u64>, anyhow::Error>;

	/// Saves the cursor for an event type
	///
	/// # Arguments
	/// * `event_id` - Unique identifier for the event type
	/// * `block` - Block number to save
	///
	/// # Returns
	/// * `Result<(), anyhow::Error>` - Success or error
	async fn set_cursor(&self, event_id: &str, block: u64) -> Result<(), anyhow::Error>;
}

/// In-memory implementation of cursor storage.
///
/// Cursors live for the process lifetime only; a restart falls back to each
/// watcher's configured start block.
#[derive(Default)]
pub struct InMemoryCursorStore {
	cursors: RwLock<HashMap<String, u64>>,
}

impl InMemoryCursorStore {
	/// Creates an empty in-memory cursor store
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl CursorStore for InMemoryCursorStore {
	async fn get_cursor(&self, event_id: &str) -> Result<Option<u64>, anyhow::Error> {
		Ok(self.cursors.read().await.get(event_id).copied())
	}

	async fn set_cursor(&self, event_id: &str, block: u64) -> Result<(), anyhow::Error> {
		self.cursors
			.write()
			.await
			.insert(event_id.to_string(), block);
		Ok(())
	}
}

/// File-based implementation of cursor storage.
///
/// Stores each event type's cursor in a text file within a configured
/// directory so progress survives restarts.
#[derive(Clone)]
pub struct FileCursorStore {
	/// Base path for all cursor files
	storage_path: PathBuf,
}

impl FileCursorStore {
	/// Creates a new file-based cursor store instance
	///
	/// Initializes storage with the provided path
	pub fn new(storage_path: PathBuf) -> Self {
		FileCursorStore { storage_path }
	}

	fn cursor_file(&self, event_id: &str) -> PathBuf {
		self.storage_path.join(format!("{}_cursor.txt", event_id))
	}
}

#[async_trait]
impl CursorStore for FileCursorStore {
	/// Retrieves the cursor from an event-specific file
	///
	/// The file is named "{event_id}_cursor.txt"
	async fn get_cursor(&self, event_id: &str) -> Result<Option<u64>, anyhow::Error> {
		let file_path = self.cursor_file(event_id);

		if !file_path.exists() {
			return Ok(None);
		}

		let content = tokio::fs::read_to_string(file_path)
			.await
			.map_err(|e| anyhow::anyhow!("Failed to read cursor: {}", e))?;
		let block = content
			.trim()
			.parse::<u64>()
			.map_err(|e| anyhow::anyhow!("Failed to parse cursor: {}", e))?;
		Ok(Some(block))
	}

	/// Saves the cursor to an event-specific file
	///
	/// # Note
	/// Overwrites any existing cursor file for the event type
	async fn set_cursor(&self, event_id: &str, block: u64) -> Result<(), anyhow::Error> {
		tokio::fs::write(self.cursor_file(event_id), block.to_string())
			.await
			.map_err(|e| anyhow::anyhow!("Failed to save cursor: {}", e))?;
		Ok(())
	}
}
