//! Explorer log-source service.
//!
//! Treats the blockchain explorer as an opaque paginated log source: one
//! HTTP GET per poll cycle, parsed into [`crate::models::LogEntry`] values.

mod client;
mod error;

pub use client::{EtherscanClient, LogSource};
pub use error::ExplorerError;
