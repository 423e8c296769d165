//! Property-based tests for the formatting helpers.

use alloy::primitives::U256;
use proptest::prelude::*;

use governor_monitor::services::formatter::{
	display_duration, format_token_amount, forum_slug,
};

proptest! {
	#[test]
	fn slug_contains_only_allowed_characters(description in ".{0,200}") {
		let slug = forum_slug(&description);
		prop_assert!(slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
	}

	#[test]
	fn slug_never_contains_doubled_hyphens_for_space_and_word_input(
		description in "[a-zA-Z0-9 -]{0,200}"
	) {
		let slug = forum_slug(&description);
		prop_assert!(!slug.contains("--"));
	}

	#[test]
	fn duration_renders_at_most_two_units(seconds in 1u64..1_000_000_000) {
		let rendered = display_duration(seconds, 2);
		let parts: Vec<&str> = rendered.split(", ").collect();
		prop_assert!(!parts.is_empty());
		prop_assert!(parts.len() <= 2);

		let unit_pattern =
			regex::Regex::new(r"^\d+ (week|day|hour|minute|second)s?$").unwrap();
		for part in &parts {
			prop_assert!(unit_pattern.is_match(part), "bad unit part: {}", part);
		}
	}

	#[test]
	fn duration_singularizes_unit_values_of_one(seconds in 1u64..1_000_000_000) {
		let rendered = display_duration(seconds, 2);
		for part in rendered.split(", ") {
			if let Some(rest) = part.strip_prefix("1 ") {
				prop_assert!(!rest.ends_with('s'), "value 1 must be singular: {}", part);
			}
		}
	}

	#[test]
	fn token_amount_round_trips(raw in any::<u128>()) {
		let amount = U256::from(raw);
		let rendered = format_token_amount(amount);

		let (whole, frac) = rendered.split_once('.').expect("always has a decimal point");
		prop_assert!(!frac.is_empty());
		// Trailing zeros are trimmed unless the fraction would be empty
		prop_assert!(frac == "0" || !frac.ends_with('0'));

		let base = U256::from(10u64).pow(U256::from(18u64));
		let whole_value = U256::from_str_radix(whole, 10).unwrap();
		let frac_padded = format!("{:0<18}", frac);
		let frac_value = U256::from_str_radix(&frac_padded, 10).unwrap();
		prop_assert_eq!(whole_value * base + frac_value, amount);
	}
}
