//! Secret handling for sensitive configuration values.
//!
//! Provides a string type with automatic memory zeroization for values like
//! API keys and bot tokens that are read from the environment and kept for
//! the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string type that automatically zeroizes its contents when dropped.
///
/// This type ensures that sensitive data like API keys and bot tokens are
/// securely erased from memory as soon as they're no longer needed. It
/// implements both `Zeroize` and `ZeroizeOnDrop` to guarantee secure memory
/// cleanup.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
	/// Creates a new `SecretString` with the given value.
	///
	/// The value will be automatically zeroized when the `SecretString` is dropped.
	pub fn new(value: String) -> Self {
		Self(value)
	}

	/// Gets a reference to the underlying string.
	///
	/// # Security Note
	///
	/// Be careful with this method as it exposes the secret value.
	/// The reference should be used immediately and not stored.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Checks if the secret value is empty
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

impl AsRef<str> for SecretString {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for SecretString {
	/// The secret must never leak into logs through Debug formatting
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString(REDACTED)")
	}
}
