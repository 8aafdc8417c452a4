//! Engine configuration management

use sn_shell::FileIOError;

pub mod engine_config;

pub use engine_config::{EngineConfig, NavigationSettings};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error(transparent)]
	FileIO(#[from] FileIOError),
	#[error("failed to (de)serialize config: {0}")]
	Serde(#[from] serde_json::Error),
	#[error("unknown config version: {0}")]
	UnknownVersion(u32),
}

/// Schema versioned configuration.
pub trait Migrate {
	fn current_version(&self) -> u32;

	fn target_version() -> u32;

	/// Brings the configuration up to [`Migrate::target_version`], one version at a time.
	fn migrate(&mut self) -> Result<(), ConfigError>;
}
