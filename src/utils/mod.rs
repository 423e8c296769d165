//! Utility modules for common functionality.
//!
//! This module provides various utility functions and types that are used across
//! the application. Currently includes:
//!
//! - logging: Logging utilities
//! - parsing: Parsing utilities
//! - http: HTTP client utilities (i.e. creating retryable HTTP clients)

pub mod http;
pub mod logging;
pub mod parsing;

pub use http::*;
pub use parsing::*;
