//! Explorer log-source client.
//!
//! Issues the single paginated `getLogs` GET against the explorer API and
//! parses its JSON envelope. The polling path deliberately uses a plain
//! `reqwest::Client`: a failed fetch is retried by the next scheduled cycle,
//! not inside the request.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::{
	models::{ExplorerConfig, LogEntry, SecretString},
	services::explorer::error::ExplorerError,
};

/// Interface for fetching log entries for one (contract, topic0) pair.
///
/// Abstracting the log source keeps the poll cycle testable against local
/// HTTP mocks and fakes.
#[async_trait]
pub trait LogSource: Send + Sync {
	/// Fetches the first page of logs matching (contract, topic0) at or
	/// after `from_block`.
	///
	/// # Arguments
	/// * `contract` - Contract address emitting the event
	/// * `topic0` - Event topic signature
	/// * `from_block` - Starting block for the query
	///
	/// # Returns
	/// * `Result<Vec<LogEntry>, ExplorerError>` - Entries in the order the
	///   explorer returned them
	async fn fetch_logs(
		&self,
		contract: &str,
		topic0: &str,
		from_block: u64,
	) -> Result<Vec<LogEntry>, ExplorerError>;
}

/// JSON envelope returned by the explorer's getLogs endpoint.
///
/// `result` is an array of log entries on success, but arrives as a plain
/// string for API-level errors (rate limiting, bad key), so it is parsed
/// in a second step.
#[derive(Debug, Deserialize)]
struct LogsEnvelope {
	#[serde(default)]
	status: Option<String>,
	#[serde(default)]
	message: Option<String>,
	result: serde_json::Value,
}

/// Etherscan-style implementation of [`LogSource`]
pub struct EtherscanClient {
	api_url: String,
	api_key: SecretString,
	page_size: u32,
	client: reqwest::Client,
}

impl EtherscanClient {
	/// Creates a new client from the explorer configuration
	pub fn new(config: &ExplorerConfig) -> Self {
		EtherscanClient {
			api_url: config.api_url.clone(),
			api_key: config.api_key.clone(),
			page_size: config.page_size,
			client: reqwest::Client::new(),
		}
	}
}

#[async_trait]
impl LogSource for EtherscanClient {
	async fn fetch_logs(
		&self,
		contract: &str,
		topic0: &str,
		from_block: u64,
	) -> Result<Vec<LogEntry>, ExplorerError> {
		let from_block = from_block.to_string();
		let page_size = self.page_size.to_string();
		let params: [(&str, &str); 8] = [
			("module", "logs"),
			("action", "getLogs"),
			("address", contract),
			("fromBlock", &from_block),
			("page", "1"),
			("offset", &page_size),
			("apikey", self.api_key.as_str()),
			("topic0", topic0),
		];

		let metadata = HashMap::from([
			("contract".to_string(), contract.to_string()),
			("topic0".to_string(), topic0.to_string()),
		]);

		let response = self
			.client
			.get(&self.api_url)
			.query(&params)
			.send()
			.await
			.map_err(|e| {
				ExplorerError::request_error(
					"Failed to reach the explorer API",
					Some(e.into()),
					Some(metadata.clone()),
				)
			})?;

		let status = response.status();
		if !status.is_success() {
			return Err(ExplorerError::response_error(
				format!("Explorer request failed with status: {}", status),
				None,
				Some(metadata),
			));
		}

		let envelope: LogsEnvelope = response.json().await.map_err(|e| {
			ExplorerError::malformed_response(
				"Explorer response is not valid JSON",
				Some(e.into()),
				Some(metadata.clone()),
			)
		})?;

		match envelope.result {
			serde_json::Value::Array(entries) => {
				serde_json::from_value(serde_json::Value::Array(entries)).map_err(|e| {
					ExplorerError::malformed_response(
						"Explorer result array has an unexpected shape",
						Some(e.into()),
						Some(metadata),
					)
				})
			}
			serde_json::Value::String(text) => {
				// API-level errors (rate limit, bad key) come back in-band
				Err(ExplorerError::malformed_response(
					format!(
						"Explorer returned an error result: {} (status {:?}, message {:?})",
						text, envelope.status, envelope.message
					),
					None,
					Some(metadata),
				))
			}
			other => Err(ExplorerError::malformed_response(
				format!("Explorer result is not an array: {}", other),
				None,
				Some(metadata),
			)),
		}
	}
}
