//! Core services implementing the business logic.
//!
//! This module contains the main service implementations:
//! - `explorer`: Log-source client for the explorer API
//! - `poller`: Cursor tracking and the scheduled poll cycle
//! - `formatter`: Notification message rendering
//! - `notification`: Delivery channel handling

pub mod explorer;
pub mod formatter;
pub mod notification;
pub mod poller;
