//! Discord notification implementation.
//!
//! Posts formatted messages to a single preconfigured channel through the
//! Discord REST API, authenticated with a bot token. Sends go through the
//! retrying HTTP client; a send that still fails is reported to the caller,
//! which logs and drops the message.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest_middleware::ClientWithMiddleware;
use serde_json::json;
use std::collections::HashMap;

use crate::{
	models::{DiscordConfig, SecretString},
	services::notification::{error::NotificationError, Notifier},
	utils::{create_retryable_http_client, RetryConfig},
};

/// Implementation of channel-message notifications via the Discord REST API
pub struct DiscordNotifier {
	/// Fully built URL of the channel messages endpoint
	url: String,
	/// Bot token for the Authorization header
	bot_token: SecretString,
	/// Destination channel identifier, kept for log context
	channel_id: String,
	/// Configured HTTP client with retry capabilities
	client: ClientWithMiddleware,
}

impl DiscordNotifier {
	/// Creates a new Discord notifier instance
	///
	/// # Arguments
	/// * `config` - Discord delivery configuration
	///
	/// # Returns
	/// * `Result<Self, NotificationError>` - Notifier instance if config is valid
	pub fn new(config: &DiscordConfig) -> Result<Self, NotificationError> {
		if config.bot_token.is_empty() {
			return Err(NotificationError::config_error(
				"Discord bot token must not be empty",
				None,
				None,
			));
		}
		if config.channel_id.is_empty() {
			return Err(NotificationError::config_error(
				"Discord channel id must not be empty",
				None,
				None,
			));
		}

		let url = format!(
			"{}/channels/{}/messages",
			config.api_url.trim_end_matches('/'),
			config.channel_id
		);

		Ok(Self {
			url,
			bot_token: config.bot_token.clone(),
			channel_id: config.channel_id.clone(),
			client: create_retryable_http_client(&RetryConfig::default(), reqwest::Client::new()),
		})
	}

	fn headers(&self) -> Result<HeaderMap, NotificationError> {
		let mut headers = HeaderMap::new();
		headers.insert(
			HeaderName::from_static("content-type"),
			HeaderValue::from_static("application/json"),
		);

		let auth = format!("Bot {}", self.bot_token.as_str());
		let mut auth_value = HeaderValue::from_str(&auth).map_err(|e| {
			NotificationError::config_error(
				"Discord bot token contains invalid header characters",
				Some(e.into()),
				None,
			)
		})?;
		// Keep the token out of any middleware/debug output
		auth_value.set_sensitive(true);
		headers.insert(HeaderName::from_static("authorization"), auth_value);

		Ok(headers)
	}
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
	/// Sends one formatted message to the configured channel
	///
	/// # Arguments
	/// * `message` - The formatted message content
	///
	/// # Returns
	/// * `Result<(), NotificationError>` - Success or error
	async fn notify(&self, message: &str) -> Result<(), NotificationError> {
		let payload = json!({ "content": message });
		let metadata = HashMap::from([("channel".to_string(), self.channel_id.clone())]);

		let response = self
			.client
			.post(&self.url)
			.headers(self.headers()?)
			.json(&payload)
			.send()
			.await
			.map_err(|e| {
				NotificationError::notify_failed(
					format!("Failed to send Discord message: {}", e),
					Some(e.into()),
					Some(metadata.clone()),
				)
			})?;

		let status = response.status();
		if !status.is_success() {
			return Err(NotificationError::notify_failed(
				format!("Discord request failed with status: {}", status),
				None,
				Some(metadata),
			));
		}

		Ok(())
	}
}
