//! Domain models for explorer log entries and governance events.
//!
//! A [`LogEntry`] is one raw item from the explorer's `getLogs` envelope; a
//! [`DecodedEvent`] is its payload interpreted per the fixed ABI schema of one
//! [`EventKind`]. Decoded events are ephemeral: constructed, rendered into a
//! notification, and discarded.

mod decode;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::parsing::parse_hex_u64;

/// The governance event types this monitor knows how to decode.
///
/// Each kind carries a fixed ABI schema and a fixed notification format; a
/// watcher is one (contract, topic0, kind) tuple on its own timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
	/// Governor `ProposalCreated` event
	ProposalCreated,
	/// Governor `ProposalQueued` event
	ProposalQueued,
	/// Token `Minted` event
	TokensMinted,
}

impl EventKind {
	/// Stable identifier used for cursor storage keys and log fields
	pub fn id(&self) -> &'static str {
		match self {
			EventKind::ProposalCreated => "proposal_created",
			EventKind::ProposalQueued => "proposal_queued",
			EventKind::TokensMinted => "tokens_minted",
		}
	}
}

impl FromStr for EventKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"proposal_created" => Ok(EventKind::ProposalCreated),
			"proposal_queued" => Ok(EventKind::ProposalQueued),
			"tokens_minted" => Ok(EventKind::TokensMinted),
			other => Err(format!(
				"Unknown event kind '{}' (expected proposal_created, proposal_queued or tokens_minted)",
				other
			)),
		}
	}
}

impl std::fmt::Display for EventKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.id())
	}
}

/// One log entry as returned by the explorer API.
///
/// Numeric fields arrive hex-encoded; `data` is the 0x-prefixed ABI-encoded
/// payload and `topics` holds the event signature followed by any indexed
/// parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
	/// Block number as a hex string ("0x112a880")
	#[serde(rename = "blockNumber")]
	pub block_number: String,

	/// Hash of the transaction that emitted the log
	#[serde(rename = "transactionHash")]
	pub transaction_hash: String,

	/// ABI-encoded event payload, 0x-prefixed hex
	pub data: String,

	/// Event topics; topics[0] is the event signature
	#[serde(default)]
	pub topics: Vec<String>,
}

impl LogEntry {
	/// Parses the hex-encoded block number
	pub fn parsed_block_number(&self) -> Result<u64, anyhow::Error> {
		parse_hex_u64(&self.block_number).map_err(|e| anyhow::anyhow!(e))
	}

	/// Decodes the 0x-prefixed payload into raw bytes
	pub fn data_bytes(&self) -> Result<Vec<u8>, anyhow::Error> {
		let digits = self.data.strip_prefix("0x").unwrap_or(&self.data);
		hex::decode(digits)
			.map_err(|e| anyhow::anyhow!("Invalid hex in log data: {}", e))
	}
}

/// A log entry's payload decoded per its event kind's fixed schema
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedEvent {
	ProposalCreated(ProposalCreated),
	ProposalQueued(ProposalQueued),
	TokensMinted(TokensMinted),
}

/// Decoded `ProposalCreated` payload.
///
/// The on-chain tuple also carries targets, values, signatures and calldatas;
/// those are validated during decoding but not kept, since notifications only
/// render the fields below.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalCreated {
	pub proposal_id: U256,
	pub proposer: Address,
	pub start_block: u64,
	pub end_block: u64,
	pub description: String,
}

/// Decoded `ProposalQueued` payload
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalQueued {
	pub proposal_id: U256,
	/// Estimated execution time as a unix timestamp
	pub eta: i64,
}

/// Decoded `Minted` payload
#[derive(Debug, Clone, PartialEq)]
pub struct TokensMinted {
	/// Recipient address, recovered from the first indexed topic
	pub recipient: String,
	/// Raw amount in base units (18 decimals)
	pub amount: U256,
}
