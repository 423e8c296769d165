//! Application configuration loaded from the environment.
//!
//! The configuration surface is environment variables (a `.env` file is
//! honored via `dotenvy` before this module runs). Required variables:
//!
//! - DISCORD_TOKEN, DISCORD_CHANNEL: delivery credentials and destination
//! - ETHERSCAN_TOKEN: explorer API key
//! - CONTRACT: governor contract address
//! - PROPOSAL_CREATED_TOPIC / PROPOSAL_QUEUED_TOPIC / MINT_TOPIC: a watcher
//!   is configured for each topic variable that is set (at least one must be)
//!
//! Optional variables with defaults: ETHERSCAN_API_URL, EXPLORER_BASE_URL,
//! FORUM_BASE_URL, DISCORD_API_URL, TOKEN_CONTRACT, PAGE_SIZE,
//! START_BLOCK_CREATE_TOPIC / START_BLOCK_QUEUED_TOPIC /
//! START_BLOCK_MINT_TOPIC, POLL_INTERVAL_CREATE / POLL_INTERVAL_QUEUED /
//! POLL_INTERVAL_MINT (seconds), CURSOR_STORE ("memory" or "file"),
//! CURSOR_DATA_DIR.

use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, str::FromStr, time::Duration};
use url::Url;

use crate::models::{
	config::{error::ConfigError, watcher_config::EventWatcherConfig},
	event::EventKind,
	security::SecretString,
};

const DEFAULT_ETHERSCAN_API_URL: &str = "https://api.etherscan.io/api";
const DEFAULT_EXPLORER_BASE_URL: &str = "https://etherscan.io";
const DEFAULT_FORUM_BASE_URL: &str = "https://forum.threshold.network/t";
const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";
const DEFAULT_PAGE_SIZE: u32 = 1000;
const DEFAULT_PROPOSAL_INTERVAL_SECS: u64 = 30;
const DEFAULT_MINT_INTERVAL_SECS: u64 = 1800;

/// Explorer log-source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
	/// Base URL of the explorer's API endpoint
	pub api_url: String,

	/// Explorer API key
	pub api_key: SecretString,

	/// Result page size for getLogs requests. Only the first page is read
	/// per cycle.
	pub page_size: u32,
}

/// Discord delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
	/// Base URL of the Discord REST API
	pub api_url: String,

	/// Bot token used in the Authorization header
	pub bot_token: SecretString,

	/// Destination channel identifier
	pub channel_id: String,
}

/// Base URLs used when rendering links inside notifications
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
	/// Explorer web UI base ("https://etherscan.io")
	pub explorer_base: String,

	/// Discussion-forum base for proposal threads
	pub forum_base: String,
}

/// Which cursor store backs the watchers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorStoreKind {
	/// Process-lifetime map; progress is lost on restart
	Memory,
	/// One cursor file per event type under the data directory
	File,
}

impl FromStr for CursorStoreKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"memory" => Ok(CursorStoreKind::Memory),
			"file" => Ok(CursorStoreKind::File),
			other => Err(format!(
				"Unknown cursor store '{}' (expected memory or file)",
				other
			)),
		}
	}
}

/// Cursor persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorStoreConfig {
	pub kind: CursorStoreKind,
	pub data_dir: PathBuf,
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
	pub explorer: ExplorerConfig,
	pub discord: DiscordConfig,
	pub links: LinkConfig,
	pub cursor_store: CursorStoreConfig,
	pub watchers: Vec<EventWatcherConfig>,
}

impl AppConfig {
	/// Loads the configuration from environment variables.
	///
	/// # Returns
	/// * `Result<Self, ConfigError>` - The loaded configuration; loading does
	///   not validate, call [`AppConfig::validate`] afterwards
	pub fn from_env() -> Result<Self, ConfigError> {
		let explorer = ExplorerConfig {
			api_url: var_or("ETHERSCAN_API_URL", DEFAULT_ETHERSCAN_API_URL),
			api_key: SecretString::new(required_var("ETHERSCAN_TOKEN")?),
			page_size: parsed_var("PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
		};

		let discord = DiscordConfig {
			api_url: var_or("DISCORD_API_URL", DEFAULT_DISCORD_API_URL),
			bot_token: SecretString::new(required_var("DISCORD_TOKEN")?),
			channel_id: required_var("DISCORD_CHANNEL")?,
		};

		let links = LinkConfig {
			explorer_base: var_or("EXPLORER_BASE_URL", DEFAULT_EXPLORER_BASE_URL),
			forum_base: var_or("FORUM_BASE_URL", DEFAULT_FORUM_BASE_URL),
		};

		let cursor_store = CursorStoreConfig {
			kind: parsed_var("CURSOR_STORE", CursorStoreKind::Memory)?,
			data_dir: PathBuf::from(var_or("CURSOR_DATA_DIR", "data")),
		};

		let governor_contract = required_var("CONTRACT")?;
		let token_contract = var_or("TOKEN_CONTRACT", &governor_contract);

		let mut watchers = Vec::new();
		if let Some(topic0) = optional_var("PROPOSAL_CREATED_TOPIC") {
			watchers.push(EventWatcherConfig {
				kind: EventKind::ProposalCreated,
				contract: governor_contract.clone(),
				topic0,
				start_block: parsed_var("START_BLOCK_CREATE_TOPIC", 0)?,
				interval: Duration::from_secs(parsed_var(
					"POLL_INTERVAL_CREATE",
					DEFAULT_PROPOSAL_INTERVAL_SECS,
				)?),
			});
		}
		if let Some(topic0) = optional_var("PROPOSAL_QUEUED_TOPIC") {
			watchers.push(EventWatcherConfig {
				kind: EventKind::ProposalQueued,
				contract: governor_contract.clone(),
				topic0,
				start_block: parsed_var("START_BLOCK_QUEUED_TOPIC", 0)?,
				interval: Duration::from_secs(parsed_var(
					"POLL_INTERVAL_QUEUED",
					DEFAULT_PROPOSAL_INTERVAL_SECS,
				)?),
			});
		}
		if let Some(topic0) = optional_var("MINT_TOPIC") {
			watchers.push(EventWatcherConfig {
				kind: EventKind::TokensMinted,
				contract: token_contract,
				topic0,
				start_block: parsed_var("START_BLOCK_MINT_TOPIC", 0)?,
				interval: Duration::from_secs(parsed_var(
					"POLL_INTERVAL_MINT",
					DEFAULT_MINT_INTERVAL_SECS,
				)?),
			});
		}

		Ok(AppConfig {
			explorer,
			discord,
			links,
			cursor_store,
			watchers,
		})
	}

	/// Validates the configuration.
	///
	/// Returns Ok(()) if valid, or an error message if invalid.
	pub fn validate(&self) -> Result<(), ConfigError> {
		validate_url(&self.explorer.api_url, "ETHERSCAN_API_URL")?;
		validate_url(&self.discord.api_url, "DISCORD_API_URL")?;
		validate_url(&self.links.explorer_base, "EXPLORER_BASE_URL")?;
		validate_url(&self.links.forum_base, "FORUM_BASE_URL")?;

		if self.explorer.api_key.is_empty() {
			return Err(ConfigError::validation_error(
				"ETHERSCAN_TOKEN must not be empty",
				None,
				None,
			));
		}

		if self.discord.bot_token.is_empty() {
			return Err(ConfigError::validation_error(
				"DISCORD_TOKEN must not be empty",
				None,
				None,
			));
		}

		if self.discord.channel_id.is_empty()
			|| !self.discord.channel_id.chars().all(|c| c.is_ascii_digit())
		{
			return Err(ConfigError::validation_error(
				format!(
					"DISCORD_CHANNEL '{}' is not a numeric channel identifier",
					self.discord.channel_id
				),
				None,
				None,
			));
		}

		if self.explorer.page_size == 0 || self.explorer.page_size > 10_000 {
			return Err(ConfigError::validation_error(
				format!(
					"PAGE_SIZE {} is out of range (1..=10000)",
					self.explorer.page_size
				),
				None,
				None,
			));
		}

		if self.watchers.is_empty() {
			return Err(ConfigError::validation_error(
				"No event topics configured; set at least one of PROPOSAL_CREATED_TOPIC, \
				 PROPOSAL_QUEUED_TOPIC, MINT_TOPIC",
				None,
				None,
			));
		}

		for watcher in &self.watchers {
			watcher.validate()?;
		}

		Ok(())
	}

	/// Returns the watcher configured for the given event kind, if any
	pub fn watcher(&self, kind: EventKind) -> Option<&EventWatcherConfig> {
		self.watchers.iter().find(|w| w.kind == kind)
	}
}

fn validate_url(value: &str, name: &str) -> Result<(), ConfigError> {
	Url::parse(value).map_err(|e| {
		ConfigError::validation_error(
			format!("{} '{}' is not a valid URL", name, value),
			Some(e.into()),
			None,
		)
	})?;
	Ok(())
}

fn required_var(name: &str) -> Result<String, ConfigError> {
	optional_var(name).ok_or_else(|| {
		ConfigError::missing_variable_error(format!("{} is not set", name), None, None)
	})
}

fn optional_var(name: &str) -> Option<String> {
	env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(name: &str, default: &str) -> String {
	optional_var(name).unwrap_or_else(|| default.to_string())
}

fn parsed_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	match optional_var(name) {
		Some(raw) => raw.parse::<T>().map_err(|e| {
			ConfigError::parse_error(format!("{} '{}': {}", name, raw, e), None, None)
		}),
		None => Ok(default),
	}
}
