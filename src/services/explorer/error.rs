//! Explorer service error types and handling.
//!
//! Covers transport failures, non-success API responses and malformed
//! envelopes returned by the explorer's log endpoint.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents possible errors that can occur while fetching logs
#[derive(ThisError, Debug)]
pub enum ExplorerError {
	/// Errors related to network connectivity issues
	#[error("Request error: {0}")]
	RequestError(ErrorContext),

	/// Non-success HTTP responses from the explorer
	#[error("Response error: {0}")]
	ResponseError(ErrorContext),

	/// Envelopes that do not carry a log entry array
	#[error("Malformed response error: {0}")]
	MalformedResponse(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl ExplorerError {
	// Request error
	pub fn request_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::RequestError(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Response error
	pub fn response_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ResponseError(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Malformed response error
	pub fn malformed_response(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::MalformedResponse(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for ExplorerError {
	fn trace_id(&self) -> String {
		match self {
			Self::RequestError(ctx) => ctx.trace_id.clone(),
			Self::ResponseError(ctx) => ctx.trace_id.clone(),
			Self::MalformedResponse(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
