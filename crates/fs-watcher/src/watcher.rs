use crate::{Behavior, Callback, Filters};

use sn_shell::PidlAbsolute;

/// A live watch on a directory.
///
/// Callbacks are delivered on the original executor the watcher was created for. Dropping
/// the watcher stops delivery, including for changes already queued.
pub trait DirectoryWatcher: Send {
	fn pidl(&self) -> &PidlAbsolute;

	fn filters(&self) -> Filters;
}

pub trait DirectoryWatcherFactory: Send + Sync {
	/// Starts watching `pidl`, or returns `None` when the location can't be watched.
	fn maybe_create(
		&self,
		pidl: &PidlAbsolute,
		filters: Filters,
		callback: Callback,
		behavior: Behavior,
	) -> Option<Box<dyn DirectoryWatcher>>;
}
