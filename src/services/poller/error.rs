//! Event poller error types and handling.
//!
//! Provides error handling for poll cycles, covering scheduling, log
//! fetching, cursor storage and entry processing.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents possible errors that can occur during event polling operations
#[derive(ThisError, Debug)]
pub enum PollerError {
	/// Errors from the job scheduler
	#[error("Scheduler error: {0}")]
	SchedulerError(ErrorContext),

	/// Errors while fetching logs from the explorer
	#[error("Fetch error: {0}")]
	FetchError(ErrorContext),

	/// Errors while reading or advancing the cursor
	#[error("Storage error: {0}")]
	StorageError(ErrorContext),

	/// Errors while processing fetched entries
	#[error("Processing error: {0}")]
	ProcessingError(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl PollerError {
	// Scheduler error
	pub fn scheduler_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::SchedulerError(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Fetch error
	pub fn fetch_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::FetchError(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Storage error
	pub fn storage_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::StorageError(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Processing error
	pub fn processing_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ProcessingError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for PollerError {
	fn trace_id(&self) -> String {
		match self {
			Self::SchedulerError(ctx) => ctx.trace_id.clone(),
			Self::FetchError(ctx) => ctx.trace_id.clone(),
			Self::StorageError(ctx) => ctx.trace_id.clone(),
			Self::ProcessingError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::{Error as IoError, ErrorKind};

	#[test]
	fn test_scheduler_error_formatting() {
		let error = PollerError::scheduler_error("test error", None, None);
		assert_eq!(error.to_string(), "Scheduler error: test error");
	}

	#[test]
	fn test_fetch_error_formatting() {
		let source_error = IoError::new(ErrorKind::NotFound, "test source");
		let error = PollerError::fetch_error(
			"test error",
			Some(Box::new(source_error)),
			Some(HashMap::from([(
				"event".to_string(),
				"proposal_created".to_string(),
			)])),
		);
		assert_eq!(
			error.to_string(),
			"Fetch error: test error [event=proposal_created]"
		);
	}

	#[test]
	fn test_storage_error_formatting() {
		let error = PollerError::storage_error("test error", None, None);
		assert_eq!(error.to_string(), "Storage error: test error");
	}

	#[test]
	fn test_processing_error_formatting() {
		let error = PollerError::processing_error("test error", None, None);
		assert_eq!(error.to_string(), "Processing error: test error");
	}

	#[test]
	fn test_from_anyhow_error() {
		let anyhow_error = anyhow::anyhow!("test anyhow error");
		let poller_error: PollerError = anyhow_error.into();
		assert!(matches!(poller_error, PollerError::Other(_)));
		assert_eq!(poller_error.to_string(), "test anyhow error");
	}

	#[test]
	fn test_trace_id_propagation() {
		let error_context = ErrorContext::new("Inner error", None, None);
		let original_trace_id = error_context.trace_id.clone();
		let poller_error = PollerError::FetchError(error_context);
		assert_eq!(poller_error.trace_id(), original_trace_id);
	}
}
