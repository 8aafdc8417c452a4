//! Engine configuration

use crate::{
	config::{ConfigError, Migrate},
	logging::LoggingConfig,
};

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use sn_fs_watcher::WatcherBackend;
use sn_shell::{FileIOError, HiddenItemPolicy, ItemType, ShellItemFilter};
use tracing::{info, warn};

const CONFIG_VERSION: u32 = 2;

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
	/// Config schema version
	pub version: u32,

	/// Whether navigations list hidden items
	pub show_hidden_items: bool,

	/// Items kept by the shell entry tree
	#[serde(default = "default_tree_item_type")]
	pub tree_item_type: ItemType,

	/// Hidden items policy of the shell entry tree
	#[serde(default)]
	pub tree_hidden_item_policy: HiddenItemPolicy,

	/// Where directory change notifications come from
	#[serde(default)]
	pub watcher_backend: WatcherBackend,

	/// Logging level
	pub log_level: String,
}

const fn default_tree_item_type() -> ItemType {
	ItemType::FoldersOnly
}

/// Settings the navigation manager reads on every navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationSettings {
	pub hidden_item_policy: HiddenItemPolicy,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			version: Self::target_version(),
			show_hidden_items: false,
			tree_item_type: default_tree_item_type(),
			tree_hidden_item_policy: HiddenItemPolicy::Exclude,
			watcher_backend: WatcherBackend::FileSystem,
			log_level: "info".to_string(),
		}
	}
}

impl EngineConfig {
	/// Load configuration from a file, creating a default one when it doesn't exist
	pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();

		if path.exists() {
			info!(path = %path.display(), "Loading config;");
			let json = fs::read_to_string(path).map_err(|e| FileIOError::from((path, e)))?;
			let mut config = serde_json::from_str::<Self>(&json)?;

			if config.version < Self::target_version() {
				info!(
					from = config.version,
					to = Self::target_version(),
					"Migrating config;"
				);
				config.migrate()?;
				config.save_to(path)?;
			}

			Ok(config)
		} else {
			warn!(path = %path.display(), "No config found, creating default;");
			let config = Self::default();
			config.save_to(path)?;
			Ok(config)
		}
	}

	/// Save configuration to disk
	pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
		let path = path.as_ref();

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).map_err(|e| {
				FileIOError::from((parent, e, "Failed to create config directory"))
			})?;
		}

		let json = serde_json::to_string_pretty(self)?;
		fs::write(path, json).map_err(|e| FileIOError::from((path, e)))?;
		info!(path = %path.display(), "Saved config;");

		Ok(())
	}

	#[must_use]
	pub const fn navigation_settings(&self) -> NavigationSettings {
		NavigationSettings {
			hidden_item_policy: if self.show_hidden_items {
				HiddenItemPolicy::Include
			} else {
				HiddenItemPolicy::Exclude
			},
		}
	}

	#[must_use]
	pub const fn tree_filter(&self) -> ShellItemFilter {
		ShellItemFilter::new(self.tree_item_type, self.tree_hidden_item_policy)
	}

	#[must_use]
	pub fn logging(&self) -> LoggingConfig {
		LoggingConfig {
			level: self.log_level.clone(),
		}
	}
}

impl Migrate for EngineConfig {
	fn current_version(&self) -> u32 {
		self.version
	}

	fn target_version() -> u32 {
		CONFIG_VERSION
	}

	fn migrate(&mut self) -> Result<(), ConfigError> {
		match self.version {
			0 => {
				self.version = 1;
				self.migrate()
			}
			1 => {
				// v2 added the tree filter and the watcher backend
				self.tree_item_type = default_tree_item_type();
				self.tree_hidden_item_policy = HiddenItemPolicy::Exclude;
				self.watcher_backend = WatcherBackend::default();
				self.version = 2;
				Ok(())
			}
			2 => Ok(()),
			v => Err(ConfigError::UnknownVersion(v)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use tempfile::tempdir;

	#[test]
	fn creates_default_config_when_missing() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("nested").join("engine.json");

		let config = EngineConfig::load_from(&path).unwrap();
		assert_eq!(config, EngineConfig::default());
		assert!(path.exists());

		let mut changed = config;
		changed.show_hidden_items = true;
		changed.watcher_backend = WatcherBackend::Shell;
		changed.save_to(&path).unwrap();

		assert_eq!(EngineConfig::load_from(&path).unwrap(), changed);
	}

	#[test]
	fn migrates_old_versions_and_saves_them() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("engine.json");
		fs::write(
			&path,
			r#"{ "version": 0, "show_hidden_items": true, "log_level": "debug" }"#,
		)
		.unwrap();

		let config = EngineConfig::load_from(&path).unwrap();
		assert_eq!(config.version, CONFIG_VERSION);
		assert!(config.show_hidden_items);
		assert_eq!(config.log_level, "debug");
		assert_eq!(config.tree_item_type, ItemType::FoldersOnly);

		let saved = serde_json::from_str::<EngineConfig>(&fs::read_to_string(&path).unwrap()).unwrap();
		assert_eq!(saved.version, CONFIG_VERSION);
	}

	#[test]
	fn rejects_unknown_versions() {
		let mut config = EngineConfig {
			version: 42,
			..EngineConfig::default()
		};

		assert!(matches!(config.migrate(), Err(ConfigError::UnknownVersion(42))));
	}

	#[test]
	fn derives_navigation_settings() {
		let mut config = EngineConfig::default();
		assert_eq!(
			config.navigation_settings().hidden_item_policy,
			HiddenItemPolicy::Exclude
		);

		config.show_hidden_items = true;
		assert_eq!(
			config.navigation_settings().hidden_item_policy,
			HiddenItemPolicy::Include
		);
		assert_eq!(config.tree_filter().item_type, ItemType::FoldersOnly);
	}
}
