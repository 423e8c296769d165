//! Structured error context shared by all service error types.
//!
//! [`ErrorContext`] carries a message, an optional source error, key-value
//! metadata, a timestamp and a trace id. Service error enums wrap one
//! context per variant, so every logged failure is attributable and
//! correlatable through its trace id.

use chrono::Utc;
use std::{collections::HashMap, fmt};
use uuid::Uuid;

/// An error enriched with metadata, a timestamp and a trace id.
///
/// The trace id is inherited from the source error when that source already
/// carries one, so wrapping an error does not break correlation across
/// service boundaries.
#[derive(Debug)]
pub struct ErrorContext {
	/// The error message
	pub message: String,
	/// The source error that caused this error
	pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
	/// Additional metadata about the error
	pub metadata: Option<HashMap<String, String>>,
	/// When the error occurred, RFC 3339
	pub timestamp: String,
	/// Unique identifier for correlating this error across log lines
	pub trace_id: String,
}

impl ErrorContext {
	/// Creates a new error context.
	///
	/// The trace id is taken from `source` when it is itself traceable,
	/// otherwise a fresh UUID is generated.
	pub fn new(
		message: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let trace_id = source
			.as_ref()
			.and_then(|src| inherited_trace_id(src.as_ref()))
			.unwrap_or_else(|| Uuid::new_v4().to_string());

		Self {
			message: message.into(),
			source,
			metadata,
			timestamp: Utc::now().to_rfc3339(),
			trace_id,
		}
	}

	/// Creates a new error context and immediately logs it.
	///
	/// Used by the service error constructors so a failure is recorded once,
	/// at the point where it is classified.
	pub fn new_with_log(
		message: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let ctx = Self::new(message, source, metadata);
		log_error(&ctx);
		ctx
	}

	/// Renders the message with its metadata appended as `[k1=v1, k2=v2]`.
	///
	/// Keys are sorted so the output is stable.
	pub fn format_with_metadata(&self) -> String {
		let pairs = match &self.metadata {
			Some(metadata) if !metadata.is_empty() => {
				let mut pairs: Vec<_> = metadata.iter().collect();
				pairs.sort_by_key(|(key, _)| key.as_str());
				pairs
			}
			_ => return self.message.clone(),
		};

		let rendered: Vec<String> = pairs
			.into_iter()
			.map(|(key, value)| format!("{}={}", key, value))
			.collect();
		format!("{} [{}]", self.message, rendered.join(", "))
	}
}

impl fmt::Display for ErrorContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_with_metadata())
	}
}

impl std::error::Error for ErrorContext {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.source
			.as_ref()
			.map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
	}
}

/// A trait for errors that can provide a trace ID
pub trait TraceableError: std::error::Error + Send + Sync {
	/// Returns the trace ID for this error
	fn trace_id(&self) -> String;
}

/// Recovers a trace id already carried by `err` or something in its chain.
fn inherited_trace_id(err: &(dyn std::error::Error + 'static)) -> Option<String> {
	if let Some(ctx) = err.downcast_ref::<ErrorContext>() {
		return Some(ctx.trace_id.clone());
	}

	macro_rules! try_downcast {
		($($ty:path),*) => {
			$(
				if let Some(e) = err.downcast_ref::<$ty>() {
					return Some(e.trace_id());
				}
			)*
		}
	}

	try_downcast!(
		crate::services::explorer::ExplorerError,
		crate::services::notification::NotificationError,
		crate::services::poller::PollerError,
		crate::models::ConfigError
	);

	// Walk a few levels of the source chain for a nested context
	let mut source = err.source();
	for _ in 0..3 {
		match source {
			Some(inner) => {
				if let Some(ctx) = inner.downcast_ref::<ErrorContext>() {
					return Some(ctx.trace_id.clone());
				}
				source = inner.source();
			}
			None => break,
		}
	}

	None
}

/// Truncates messages at the first HTML tag.
///
/// Upstream services answer some failures with whole HTML error pages;
/// only the leading text belongs in a log line.
fn strip_html(message: &str) -> String {
	if message.contains("<html>") || message.contains("<head>") || message.contains("<body>") {
		if let Some(pos) = message.find('<') {
			return message[..pos].trim().to_string();
		}
	}
	message.to_string()
}

/// Renders an error and its sources as one indented chain.
fn render_chain(err: &dyn std::error::Error) -> String {
	let mut rendered = strip_html(&err.to_string());
	let mut source = err.source();

	while let Some(inner) = source {
		rendered.push_str("\n\tCaused by: ");
		rendered.push_str(&strip_html(&inner.to_string()));
		source = inner.source();
	}

	rendered
}

fn log_error(error: &ErrorContext) {
	match &error.source {
		Some(source) => tracing::error!(
			message = error.format_with_metadata(),
			trace_id = %error.trace_id,
			timestamp = %error.timestamp,
			error.chain = %render_chain(&**source),
			"Error occurred"
		),
		None => tracing::error!(
			message = error.format_with_metadata(),
			trace_id = %error.trace_id,
			timestamp = %error.timestamp,
			"Error occurred"
		),
	}
}
