//! Notification error types and handling.
//!
//! Covers configuration problems and failed sends on the delivery channel.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents possible errors that can occur while sending notifications
#[derive(ThisError, Debug)]
pub enum NotificationError {
	/// Errors related to invalid notifier configuration
	#[error("Config error: {0}")]
	ConfigError(ErrorContext),

	/// Errors when the outbound send fails
	#[error("Notify failed: {0}")]
	NotifyFailed(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl NotificationError {
	// Config error
	pub fn config_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ConfigError(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Notify failed error
	pub fn notify_failed(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::NotifyFailed(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for NotificationError {
	fn trace_id(&self) -> String {
		match self {
			Self::ConfigError(ctx) => ctx.trace_id.clone(),
			Self::NotifyFailed(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
