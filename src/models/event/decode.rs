//! ABI decoding of log payloads into [`DecodedEvent`] values.
//!
//! Each event kind has a fixed tuple schema known in advance; payloads are
//! decoded with `alloy`'s dynamic ABI machinery. A payload that does not
//! match its schema is an error for that single entry, not for the cycle.

use alloy::core::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{Address, U256};
use anyhow::{anyhow, Context};

use super::{DecodedEvent, EventKind, LogEntry, ProposalCreated, ProposalQueued, TokensMinted};

impl EventKind {
	/// Decodes a log entry's payload per this kind's fixed schema.
	///
	/// # Arguments
	/// * `entry` - The raw log entry whose `data` (and, for mints, `topics`)
	///   carry the encoded event
	///
	/// # Returns
	/// * `Result<DecodedEvent, anyhow::Error>` - The decoded event or a
	///   description of the schema mismatch
	pub fn decode(&self, entry: &LogEntry) -> Result<DecodedEvent, anyhow::Error> {
		match self {
			EventKind::ProposalCreated => decode_proposal_created(entry),
			EventKind::ProposalQueued => decode_proposal_queued(entry),
			EventKind::TokensMinted => decode_tokens_minted(entry),
		}
	}
}

/// Schema of the governor's `ProposalCreated` data payload
fn proposal_created_schema() -> DynSolType {
	DynSolType::Tuple(vec![
		DynSolType::Uint(256),
		DynSolType::Address,
		DynSolType::Array(Box::new(DynSolType::Address)),
		DynSolType::Array(Box::new(DynSolType::Uint(256))),
		DynSolType::Array(Box::new(DynSolType::String)),
		DynSolType::Array(Box::new(DynSolType::Bytes)),
		DynSolType::Uint(256),
		DynSolType::Uint(256),
		DynSolType::String,
	])
}

fn decode_proposal_created(entry: &LogEntry) -> Result<DecodedEvent, anyhow::Error> {
	let data = entry.data_bytes()?;
	let fields = decode_tuple(&proposal_created_schema(), &data)
		.with_context(|| "Payload does not match the ProposalCreated schema")?;

	let proposal_id = uint_field(&fields, 0)?;
	let proposer = address_field(&fields, 1)?;
	let start_block = u64_field(&fields, 6)?;
	let end_block = u64_field(&fields, 7)?;
	let description = string_field(&fields, 8)?;

	Ok(DecodedEvent::ProposalCreated(ProposalCreated {
		proposal_id,
		proposer,
		start_block,
		end_block,
		description,
	}))
}

/// Schema of the governor's `ProposalQueued` data payload
fn proposal_queued_schema() -> DynSolType {
	DynSolType::Tuple(vec![DynSolType::Uint(256), DynSolType::Uint(256)])
}

fn decode_proposal_queued(entry: &LogEntry) -> Result<DecodedEvent, anyhow::Error> {
	let data = entry.data_bytes()?;
	let fields = decode_tuple(&proposal_queued_schema(), &data)
		.with_context(|| "Payload does not match the ProposalQueued schema")?;

	let proposal_id = uint_field(&fields, 0)?;
	let eta_raw = u64_field(&fields, 1)?;
	let eta = i64::try_from(eta_raw)
		.map_err(|_| anyhow!("Queued eta {} does not fit a unix timestamp", eta_raw))?;

	Ok(DecodedEvent::ProposalQueued(ProposalQueued {
		proposal_id,
		eta,
	}))
}

fn decode_tokens_minted(entry: &LogEntry) -> Result<DecodedEvent, anyhow::Error> {
	let data = entry.data_bytes()?;
	let fields = decode_tuple(&DynSolType::Tuple(vec![DynSolType::Uint(256)]), &data)
		.with_context(|| "Payload does not match the Minted schema")?;
	let amount = uint_field(&fields, 0)?;

	// The recipient is indexed, so it lives in the topics rather than the data
	let topic = entry
		.topics
		.get(1)
		.ok_or_else(|| anyhow!("Minted log has no indexed recipient topic"))?;
	let recipient = recipient_from_topic(topic)?;

	Ok(DecodedEvent::TokensMinted(TokensMinted {
		recipient,
		amount,
	}))
}

/// Recovers an address from the right-most 40 hex characters of an indexed topic
fn recipient_from_topic(topic: &str) -> Result<String, anyhow::Error> {
	let digits = topic.strip_prefix("0x").unwrap_or(topic);
	if !digits.is_ascii() || digits.len() < 40 {
		return Err(anyhow!("Topic '{}' cannot hold an address", topic));
	}
	let tail = &digits[digits.len() - 40..];
	hex::decode(tail).map_err(|e| anyhow!("Topic '{}' is not valid hex: {}", topic, e))?;
	Ok(format!("0x{}", tail.to_lowercase()))
}

fn decode_tuple(schema: &DynSolType, data: &[u8]) -> Result<Vec<DynSolValue>, anyhow::Error> {
	let decoded = schema
		.abi_decode_params(data)
		.map_err(|e| anyhow!("ABI decoding failed: {}", e))?;
	match decoded {
		DynSolValue::Tuple(fields) => Ok(fields),
		other => Err(anyhow!("Expected a tuple, decoded {:?}", other.as_type())),
	}
}

fn uint_field(fields: &[DynSolValue], index: usize) -> Result<U256, anyhow::Error> {
	fields
		.get(index)
		.and_then(|v| v.as_uint())
		.map(|(value, _)| value)
		.ok_or_else(|| anyhow!("Tuple field {} is not a uint", index))
}

fn u64_field(fields: &[DynSolValue], index: usize) -> Result<u64, anyhow::Error> {
	let value = uint_field(fields, index)?;
	u64::try_from(value).map_err(|_| anyhow!("Tuple field {} does not fit in u64", index))
}

fn address_field(fields: &[DynSolValue], index: usize) -> Result<Address, anyhow::Error> {
	fields
		.get(index)
		.and_then(|v| v.as_address())
		.ok_or_else(|| anyhow!("Tuple field {} is not an address", index))
}

fn string_field(fields: &[DynSolValue], index: usize) -> Result<String, anyhow::Error> {
	fields
		.get(index)
		.and_then(|v| v.as_str())
		.map(|s| s.to_string())
		.ok_or_else(|| anyhow!("Tuple field {} is not a string", index))
}
