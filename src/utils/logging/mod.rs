//! Logging setup, driven by environment variables.
//!
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: "trace" | "debug" | "info" (default) | "warn" | "error"
//! - LOG_DATA_DIR: directory for log files, default "logs/"
//! - LOG_MAX_SIZE: maximum log file size in bytes before rolling, default 1GB

pub mod error;

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use std::{
	env,
	fs::{create_dir_all, metadata},
	path::Path,
};
use tracing::{info, Subscriber};
use tracing_subscriber::{
	filter::EnvFilter,
	fmt,
	fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
	prelude::*,
	registry::LookupSpan,
};

lazy_static! {
	// Covers the color sequences tracing's own formatter emits
	static ref ANSI_SEQUENCE: Regex = Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").unwrap();
}

/// Wraps an event formatter and strips ANSI escapes from its output.
///
/// Log files must stay plain text; some layers emit color codes regardless
/// of the `with_ansi` setting.
struct PlainTextFormatter<T> {
	inner: T,
}

impl<S, N, T> FormatEvent<S, N> for PlainTextFormatter<T>
where
	S: Subscriber + for<'a> LookupSpan<'a>,
	N: for<'a> FormatFields<'a> + 'static,
	T: FormatEvent<S, N>,
{
	fn format_event(
		&self,
		ctx: &FmtContext<'_, S, N>,
		mut writer: Writer<'_>,
		event: &tracing::Event<'_>,
	) -> std::fmt::Result {
		let mut buf = String::new();
		self.inner.format_event(ctx, Writer::new(&mut buf), event)?;
		write!(writer, "{}", ANSI_SEQUENCE.replace_all(&buf, ""))
	}
}

/// Builds the log file name for a given date and roll index.
///
/// "logs/governor-monitor.log" with date "2024-01-01" and index 2 becomes
/// "logs/governor-monitor-2024-01-01.2.log".
pub fn rolled_log_path(base_path: &str, date: &str, index: u32) -> String {
	let stem = base_path.strip_suffix(".log").unwrap_or(base_path);
	format!("{}-{}.{}.log", stem, date, index)
}

/// Picks the log file to write to, rolling past files that exceed `max_size`.
///
/// Starts from `candidate` and bumps the roll index until it reaches a file
/// that is missing or still under the limit.
pub fn roll_for_size(candidate: &str, base_path: &str, date: &str, max_size: u64) -> String {
	let mut path = candidate.to_string();
	let mut index = 1;
	while let Ok(meta) = metadata(&path) {
		if meta.len() <= max_size {
			break;
		}
		path = rolled_log_path(base_path, date, index);
		index += 1;
	}
	path
}

fn level_from_env() -> tracing::Level {
	match env::var("LOG_LEVEL")
		.unwrap_or_else(|_| "info".to_string())
		.to_lowercase()
		.as_str()
	{
		"trace" => tracing::Level::TRACE,
		"debug" => tracing::Level::DEBUG,
		"warn" => tracing::Level::WARN,
		"error" => tracing::Level::ERROR,
		_ => tracing::Level::INFO,
	}
}

fn max_size_from_env() -> u64 {
	env::var("LOG_MAX_SIZE")
		.map(|raw| {
			raw.parse::<u64>()
				.expect("LOG_MAX_SIZE must be a valid u64 if set")
		})
		.unwrap_or(1_073_741_824)
}

/// Initializes the global tracing subscriber from the environment.
///
/// Stdout mode keeps ANSI colors; file mode writes plain text into a
/// date-stamped file under LOG_DATA_DIR, rolling to a new index once the
/// current file passes LOG_MAX_SIZE.
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
	let log_mode = env::var("LOG_MODE").unwrap_or_else(|_| "stdout".to_string());
	let file_mode = log_mode.to_lowercase() == "file";

	let format = fmt::format()
		.with_level(true)
		.with_target(true)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_ansi(!file_mode)
		.compact();

	let registry =
		tracing_subscriber::registry().with(EnvFilter::new(level_from_env().to_string()));

	if file_mode {
		let log_dir = env::var("LOG_DATA_DIR").unwrap_or_else(|_| "logs/".to_string());
		let base_path = format!("{}/governor-monitor.log", log_dir.trim_end_matches('/'));
		let date = Utc::now().format("%Y-%m-%d").to_string();

		let candidate = rolled_log_path(&base_path, &date, 1);
		if let Some(parent) = Path::new(&candidate).parent() {
			create_dir_all(parent).expect("Failed to create log directory");
		}
		let final_path = roll_for_size(&candidate, &base_path, &date, max_size_from_env());

		let appender = tracing_appender::rolling::never(
			Path::new(&final_path).parent().unwrap_or(Path::new(".")),
			Path::new(&final_path).file_name().unwrap_or_default(),
		);

		registry
			.with(
				fmt::layer()
					.event_format(PlainTextFormatter { inner: format })
					.with_writer(appender)
					.fmt_fields(fmt::format::PrettyFields::new()),
			)
			.init();
	} else {
		registry
			.with(
				fmt::layer()
					.event_format(format)
					.fmt_fields(fmt::format::PrettyFields::new()),
			)
			.init();
	}

	info!("Logging is successfully configured (mode: {})", log_mode);
	Ok(())
}
