//! Parsing utilities
//!
//! This module provides utilities for parsing various types of data.

use byte_unit::Byte;
use std::str::FromStr;

/// Parses a string argument into a `u64` value representing a file size.
///
/// Accepts human-readable formats like "1GB", "500MB", "1024KB", etc.
/// Returns an error if the format is invalid.
pub fn parse_string_to_bytes_size(s: &str) -> Result<u64, String> {
	match Byte::from_str(s) {
		Ok(byte) => Ok(byte.as_u64()),
		Err(e) => Err(format!("Invalid size format: '{}'. Error: {}", s, e)),
	}
}

/// Parses a hex-encoded quantity (with or without a "0x" prefix) into a `u64`.
///
/// Explorer log entries carry block numbers as hex strings ("0x112a880").
///
/// # Arguments
/// * `input` - The hex string to parse
///
/// # Returns
/// * `Result<u64, String>` - The parsed value or a description of the failure
pub fn parse_hex_u64(input: &str) -> Result<u64, String> {
	let trimmed = input.trim();
	let digits = trimmed
		.strip_prefix("0x")
		.or_else(|| trimmed.strip_prefix("0X"))
		.unwrap_or(trimmed);

	if digits.is_empty() {
		return Err(format!("Invalid hex quantity: '{}'", input));
	}

	u64::from_str_radix(digits, 16).map_err(|e| format!("Invalid hex quantity: '{}': {}", input, e))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_valid_size_formats() {
		let test_cases = vec![
			("1B", 1),
			("1KB", 1000),
			("1KiB", 1024),
			("1MB", 1000 * 1000),
			("1MiB", 1024 * 1024),
			("1GB", 1000 * 1000 * 1000),
			("500MB", 500 * 1000 * 1000),
			("0B", 0),
		];

		for (input, expected) in test_cases {
			let result = parse_string_to_bytes_size(input);
			assert!(result.is_ok(), "Failed to parse valid input: {}", input);
			assert_eq!(
				result.unwrap(),
				expected,
				"Incorrect parsing for input: {}",
				input
			);
		}
	}

	#[test]
	fn test_invalid_size_formats() {
		let invalid_inputs = vec!["", "invalid", "GB", "-1GB", "1.5.5GB", "1GB2"];

		for input in invalid_inputs {
			let result = parse_string_to_bytes_size(input);
			assert!(
				result.is_err(),
				"Expected error for invalid input: {}",
				input
			);
		}
	}

	#[test]
	fn test_parse_hex_u64() {
		assert_eq!(parse_hex_u64("0x64").unwrap(), 100);
		assert_eq!(parse_hex_u64("0X64").unwrap(), 100);
		assert_eq!(parse_hex_u64("64").unwrap(), 100);
		assert_eq!(parse_hex_u64("0x0").unwrap(), 0);
		assert_eq!(parse_hex_u64(" 0x112a880 ").unwrap(), 18_000_000);
	}

	#[test]
	fn test_parse_hex_u64_invalid() {
		for input in ["", "0x", "0xzz", "not hex", "0x-1"] {
			assert!(
				parse_hex_u64(input).is_err(),
				"Expected error for invalid input: {}",
				input
			);
		}
	}
}
