//! Configuration loading and validation.
//!
//! The configuration surface is environment variables; each config struct
//! carries a `validate()` that is run once at startup (and by `--check`).

mod app_config;
mod error;
mod watcher_config;

pub use app_config::{
	AppConfig, CursorStoreConfig, CursorStoreKind, DiscordConfig, ExplorerConfig, LinkConfig,
};
pub use error::ConfigError;
pub use watcher_config::EventWatcherConfig;
