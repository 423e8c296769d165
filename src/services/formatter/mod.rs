//! Notification message rendering.
//!
//! Turns a decoded event plus its raw log entry into the Discord-markdown
//! message body for that event type. Every message carries the event
//! identifier, an explorer block-page link and an explorer transaction-page
//! link; the helpers below implement the formatting contracts (voting-window
//! duration, forum slug, ETA, token amount).

use alloy::primitives::U256;
use chrono::DateTime;
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{DecodedEvent, LinkConfig, LogEntry, ProposalCreated, ProposalQueued, TokensMinted};

/// Average seconds per block, used to estimate the voting window
const BLOCK_TIME_SECONDS: u64 = 12;

/// Token base-unit decimals for mint amounts
const TOKEN_DECIMALS: usize = 18;

lazy_static! {
	static ref HYPHEN_RUNS: Regex = Regex::new("-{2,}").unwrap();
	static ref NON_SLUG_CHARS: Regex = Regex::new("[^a-zA-Z0-9-]").unwrap();
}

/// Renders the notification body for a decoded event.
///
/// # Arguments
/// * `event` - The decoded event payload
/// * `entry` - The raw log entry (for the transaction hash)
/// * `block_number` - The entry's parsed block number
/// * `links` - Base URLs for explorer and forum links
pub fn render_event(
	event: &DecodedEvent,
	entry: &LogEntry,
	block_number: u64,
	links: &LinkConfig,
) -> String {
	match event {
		DecodedEvent::ProposalCreated(e) => render_proposal_created(e, entry, block_number, links),
		DecodedEvent::ProposalQueued(e) => render_proposal_queued(e, entry, block_number, links),
		DecodedEvent::TokensMinted(e) => render_tokens_minted(e, entry, block_number, links),
	}
}

fn render_proposal_created(
	event: &ProposalCreated,
	entry: &LogEntry,
	block_number: u64,
	links: &LinkConfig,
) -> String {
	let proposer = event.proposer.to_string();
	let voting_seconds = event.end_block.saturating_sub(event.start_block) * BLOCK_TIME_SECONDS;
	format!(
		"A new [Proposal]({forum}/{slug}) was added by [{proposer}]({explorer}/address/{proposer}). \
		 Voters have approximately **{duration}** to vote on the proposal.\n\n\
		 **Proposal Id:** {id}\n\
		 **Block Number:** {explorer}/block/{block}\n\
		 **Transaction:** [click here]({explorer}/tx/{tx})\n\
		 **Description:**\n{description}",
		forum = links.forum_base,
		slug = forum_slug(&event.description),
		proposer = proposer,
		explorer = links.explorer_base,
		duration = display_duration(voting_seconds, 2),
		id = event.proposal_id,
		block = block_number,
		tx = entry.transaction_hash,
		description = event.description,
	)
}

fn render_proposal_queued(
	event: &ProposalQueued,
	entry: &LogEntry,
	block_number: u64,
	links: &LinkConfig,
) -> String {
	format!(
		"Proposal with the below ID is now being considered by the DAO and estimated \
		 completion time is {eta}\n\n\
		 **Proposal Id:** {id}\n\
		 **Block Number:** {explorer}/block/{block}\n\
		 **TX Hash:** [here]({explorer}/tx/{tx})\n",
		eta = format_eta(event.eta),
		id = event.proposal_id,
		explorer = links.explorer_base,
		block = block_number,
		tx = entry.transaction_hash,
	)
}

fn render_tokens_minted(
	event: &TokensMinted,
	entry: &LogEntry,
	block_number: u64,
	links: &LinkConfig,
) -> String {
	format!(
		"**{amount}** tokens were minted to [{recipient}]({explorer}/address/{recipient}).\n\n\
		 **Block Number:** {explorer}/block/{block}\n\
		 **Transaction:** [click here]({explorer}/tx/{tx})\n",
		amount = format_token_amount(event.amount),
		recipient = event.recipient,
		explorer = links.explorer_base,
		block = block_number,
		tx = entry.transaction_hash,
	)
}

/// Renders a duration as its two largest non-zero units, comma-joined.
///
/// Units run weeks/days/hours/minutes/seconds and a unit of value 1 is
/// singularized: 21600 renders "6 hours", 604800 renders "1 week".
pub fn display_duration(seconds: u64, granularity: usize) -> String {
	const INTERVALS: [(&str, u64); 5] = [
		("week", 604_800),
		("day", 86_400),
		("hour", 3_600),
		("minute", 60),
		("second", 1),
	];

	let mut remaining = seconds;
	let mut parts = Vec::new();
	for (name, count) in INTERVALS {
		let value = remaining / count;
		if value > 0 {
			remaining -= value * count;
			if value == 1 {
				parts.push(format!("{} {}", value, name));
			} else {
				parts.push(format!("{} {}s", value, name));
			}
		}
	}

	if parts.is_empty() {
		return "0 seconds".to_string();
	}
	parts.truncate(granularity);
	parts.join(", ")
}

/// Derives a forum-thread slug from a proposal description.
///
/// Spaces become hyphens, runs of hyphens collapse to one, and everything
/// outside `[A-Za-z0-9-]` is stripped.
pub fn forum_slug(description: &str) -> String {
	let hyphenated = description.replace(' ', "-");
	let collapsed = HYPHEN_RUNS.replace_all(&hyphenated, "-");
	NON_SLUG_CHARS.replace_all(&collapsed, "").to_string()
}

/// Renders a raw 18-decimal token amount as a decimal string.
///
/// The fractional part keeps at least one digit with trailing zeros trimmed:
/// 2 * 10^18 renders "2.0".
pub fn format_token_amount(amount: U256) -> String {
	let base = U256::from(10u64).pow(U256::from(TOKEN_DECIMALS as u64));
	let whole = amount / base;
	let frac = amount % base;

	let frac_digits = format!("{:0>width$}", frac.to_string(), width = TOKEN_DECIMALS);
	let trimmed = frac_digits.trim_end_matches('0');
	if trimmed.is_empty() {
		format!("{}.0", whole)
	} else {
		format!("{}.{}", whole, trimmed)
	}
}

/// Renders a unix timestamp as an absolute UTC date-time string
pub fn format_eta(eta: i64) -> String {
	DateTime::from_timestamp(eta, 0)
		.map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
		.unwrap_or_else(|| eta.to_string())
}
