use std::sync::Arc;

use sn_executor::Executor;
use sn_fs_watcher::{
	create_watcher_factory, DirectoryWatcherFactory, ShellChangeManager, WatcherBackend,
};
use sn_shell::{FileSystemNamespace, PidlUpdater, ShellEnumerator, ShellNamespace};
use tokio::runtime::Handle;

/// The shell collaborators shared by navigation and the entry tree.
///
/// Everything in here is read-only and shared between the enumeration executor and the
/// original executor.
#[derive(Clone)]
pub struct ShellContext {
	namespace: Arc<dyn ShellNamespace>,
	enumerator: Arc<dyn ShellEnumerator>,
	pidl_updater: Arc<dyn PidlUpdater>,
	watcher_factory: Arc<dyn DirectoryWatcherFactory>,
}

impl ShellContext {
	pub fn new(
		namespace: Arc<dyn ShellNamespace>,
		enumerator: Arc<dyn ShellEnumerator>,
		pidl_updater: Arc<dyn PidlUpdater>,
		watcher_factory: Arc<dyn DirectoryWatcherFactory>,
	) -> Self {
		Self {
			namespace,
			enumerator,
			pidl_updater,
			watcher_factory,
		}
	}

	/// Uses one value as namespace, enumerator and pidl updater.
	pub fn from_namespace<N>(namespace: Arc<N>, watcher_factory: Arc<dyn DirectoryWatcherFactory>) -> Self
	where
		N: ShellNamespace + ShellEnumerator + PidlUpdater + 'static,
	{
		Self::new(
			Arc::clone(&namespace) as Arc<dyn ShellNamespace>,
			Arc::clone(&namespace) as Arc<dyn ShellEnumerator>,
			namespace as Arc<dyn PidlUpdater>,
			watcher_factory,
		)
	}

	/// The local file system, watched with the given backend.
	pub fn file_system(
		original_executor: Arc<dyn Executor>,
		runtime: &Handle,
		backend: WatcherBackend,
		change_manager: &ShellChangeManager,
	) -> Self {
		Self::from_namespace(
			Arc::new(FileSystemNamespace::new()),
			create_watcher_factory(backend, original_executor, runtime, change_manager),
		)
	}

	#[must_use]
	pub fn namespace(&self) -> &Arc<dyn ShellNamespace> {
		&self.namespace
	}

	#[must_use]
	pub fn enumerator(&self) -> &Arc<dyn ShellEnumerator> {
		&self.enumerator
	}

	#[must_use]
	pub fn pidl_updater(&self) -> &Arc<dyn PidlUpdater> {
		&self.pidl_updater
	}

	#[must_use]
	pub fn watcher_factory(&self) -> &Arc<dyn DirectoryWatcherFactory> {
		&self.watcher_factory
	}
}
