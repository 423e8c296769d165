//! Governance event monitoring and notification service.
//!
//! This library polls a blockchain explorer's log API for governor contract
//! events (proposals created, proposals queued, tokens minted), decodes their
//! ABI-encoded payloads, and posts formatted alerts to a Discord channel.
//! It includes:
//!
//! - Environment-backed configuration management
//! - A generic cursor-tracking poll cycle shared by all event types
//! - Independently scheduled periodic watchers per event type
//! - Discord channel-message delivery
//!
//! # Module Structure
//!
//! - `bootstrap`: Bootstraps the application
//! - `models`: Data structures for configuration and explorer data
//! - `services`: Core business logic: polling, decoding, formatting, delivery
//! - `utils`: Common utilities and helper functions

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;
