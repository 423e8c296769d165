//! Notification service implementation.
//!
//! This module provides functionality to send formatted messages to the
//! delivery channel. Delivery is fire-and-forget: a failed send is logged by
//! the caller and the message is dropped.

use async_trait::async_trait;

mod discord;
mod error;

pub use discord::DiscordNotifier;
pub use error::NotificationError;

/// Interface for sending one formatted message to the configured destination.
///
/// The poll cycle only depends on this trait, so tests can capture messages
/// without any network.
#[async_trait]
pub trait Notifier: Send + Sync {
	/// Sends a formatted message
	///
	/// # Arguments
	/// * `message` - The message content to deliver
	///
	/// # Returns
	/// * `Result<(), NotificationError>` - Success or error
	async fn notify(&self, message: &str) -> Result<(), NotificationError>;
}
