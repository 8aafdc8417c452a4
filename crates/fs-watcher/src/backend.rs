use crate::{DirectoryWatcherFactory, FileSystemWatcherFactory, ShellChangeManager, ShellWatcherFactory};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sn_executor::Executor;
use tokio::runtime::Handle;
use tracing::debug;

/// Where directory change notifications come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatcherBackend {
	/// The operating system's file system notifications.
	#[default]
	FileSystem,
	/// In-process notifications posted to a [`ShellChangeManager`].
	Shell,
}

/// `runtime` hosts the file system backend's background tick.
pub fn create_watcher_factory(
	backend: WatcherBackend,
	original_executor: Arc<dyn Executor>,
	runtime: &Handle,
	change_manager: &ShellChangeManager,
) -> Arc<dyn DirectoryWatcherFactory> {
	debug!(?backend, "Creating directory watcher factory;");

	match backend {
		WatcherBackend::FileSystem => Arc::new(FileSystemWatcherFactory::new(original_executor, runtime)),
		WatcherBackend::Shell => Arc::new(ShellWatcherFactory::new(change_manager.clone())),
	}
}
