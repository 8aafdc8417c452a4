use crate::{
	event::ChangeKind, Behavior, Callback, DirectoryWatcher, DirectoryWatcherFactory, Filters,
};

use std::{
	collections::HashMap,
	fmt,
	sync::{Arc, Weak},
};

use parking_lot::Mutex;
use sn_executor::Executor;
use sn_shell::PidlAbsolute;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

impl fmt::Display for WatchId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// A change reported to the [`ShellChangeManager`] by whoever performed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellChange {
	pub kind: ChangeKind,
	pub pidl1: PidlAbsolute,
	pub pidl2: Option<PidlAbsolute>,
	pub is_directory: Option<bool>,
}

impl ShellChange {
	#[must_use]
	pub const fn created(pidl: PidlAbsolute, is_directory: bool) -> Self {
		Self::new(ChangeKind::Added, pidl, None, Some(is_directory))
	}

	#[must_use]
	pub const fn renamed(old: PidlAbsolute, new: PidlAbsolute, is_directory: bool) -> Self {
		Self::new(ChangeKind::Renamed, old, Some(new), Some(is_directory))
	}

	#[must_use]
	pub const fn updated(pidl: PidlAbsolute) -> Self {
		Self::new(ChangeKind::Modified, pidl, None, None)
	}

	#[must_use]
	pub const fn attributes_changed(pidl: PidlAbsolute) -> Self {
		Self::new(ChangeKind::Attributes, pidl, None, None)
	}

	#[must_use]
	pub const fn removed(pidl: PidlAbsolute, is_directory: bool) -> Self {
		Self::new(ChangeKind::Removed, pidl, None, Some(is_directory))
	}

	#[must_use]
	pub const fn contents_changed(pidl: PidlAbsolute) -> Self {
		Self::new(ChangeKind::ContentsChanged, pidl, None, Some(true))
	}

	const fn new(
		kind: ChangeKind,
		pidl1: PidlAbsolute,
		pidl2: Option<PidlAbsolute>,
		is_directory: Option<bool>,
	) -> Self {
		Self {
			kind,
			pidl1,
			pidl2,
			is_directory,
		}
	}

	fn concerns(&self, watched: &PidlAbsolute, behavior: Behavior) -> bool {
		let matches = |pidl: &PidlAbsolute| {
			watched == pidl
				|| match behavior {
					Behavior::NonRecursive => watched.is_parent(pidl),
					Behavior::Recursive => watched.is_ancestor(pidl),
				}
		};

		matches(&self.pidl1) || self.pidl2.as_ref().is_some_and(matches)
	}
}

struct Watch {
	pidl: PidlAbsolute,
	filters: Filters,
	behavior: Behavior,
	callback: Callback,
}

#[derive(Default)]
struct State {
	next_watch_id: u64,
	watches: HashMap<WatchId, Watch>,
	pending: Vec<(WatchId, Arc<ShellChange>)>,
	is_flush_scheduled: bool,
}

struct Inner {
	original_executor: Arc<dyn Executor>,
	state: Mutex<State>,
}

impl Inner {
	fn flush(&self) {
		let pending = {
			let mut state = self.state.lock();
			state.is_flush_scheduled = false;
			std::mem::take(&mut state.pending)
		};

		trace!(changes = pending.len(), "Flushing shell changes;");

		for (watch_id, change) in pending {
			// Watches stopped after the change was queued receive nothing
			let Some(callback) = self
				.state
				.lock()
				.watches
				.get(&watch_id)
				.map(|watch| Arc::clone(&watch.callback))
			else {
				continue;
			};

			callback(change.kind.event(), &change.pidl1, change.pidl2.as_ref());
		}
	}
}

/// Process-wide hub for shell change notifications.
///
/// Whoever changes an item calls [`ShellChangeManager::notify`]; changes are matched
/// against the registered watches right away and delivered in one batch on the original
/// executor.
#[derive(Clone)]
pub struct ShellChangeManager {
	inner: Arc<Inner>,
}

impl ShellChangeManager {
	pub fn new(original_executor: Arc<dyn Executor>) -> Self {
		Self {
			inner: Arc::new(Inner {
				original_executor,
				state: Mutex::default(),
			}),
		}
	}

	pub fn start_watching(
		&self,
		pidl: &PidlAbsolute,
		filters: Filters,
		callback: Callback,
		behavior: Behavior,
	) -> WatchId {
		let mut state = self.inner.state.lock();
		let watch_id = WatchId(state.next_watch_id);
		state.next_watch_id += 1;

		state.watches.insert(
			watch_id,
			Watch {
				pidl: pidl.without_metadata(),
				filters,
				behavior,
				callback,
			},
		);

		trace!(%watch_id, %pidl, "Started watching;");

		watch_id
	}

	pub fn stop_watching(&self, watch_id: WatchId) {
		if self.inner.state.lock().watches.remove(&watch_id).is_none() {
			debug!(%watch_id, "Tried to stop an unknown watch;");
		}
	}

	pub fn notify(&self, change: ShellChange) {
		let required = Filters::required_for(change.kind, change.is_directory);
		let change = Arc::new(change);

		let schedule_flush = {
			let mut state = self.inner.state.lock();

			let mut matched = state
				.watches
				.iter()
				.filter(|(_, watch)| {
					watch.filters.intersects(required) && change.concerns(&watch.pidl, watch.behavior)
				})
				.map(|(watch_id, _)| *watch_id)
				.collect::<Vec<_>>();

			if matched.is_empty() {
				return;
			}

			matched.sort_unstable();
			state
				.pending
				.extend(matched.into_iter().map(|watch_id| (watch_id, Arc::clone(&change))));

			!std::mem::replace(&mut state.is_flush_scheduled, true)
		};

		if schedule_flush {
			let inner = Arc::downgrade(&self.inner);
			self.inner.original_executor.post(Box::new(move || {
				if let Some(inner) = inner.upgrade() {
					inner.flush();
				}
			}));
		}
	}

	#[must_use]
	pub fn num_watches(&self) -> usize {
		self.inner.state.lock().watches.len()
	}

	pub fn watch(
		&self,
		pidl: &PidlAbsolute,
		filters: Filters,
		callback: Callback,
		behavior: Behavior,
	) -> ShellWatcher {
		ShellWatcher {
			watch_id: self.start_watching(pidl, filters, callback, behavior),
			pidl: pidl.clone(),
			filters,
			manager: Arc::downgrade(&self.inner),
		}
	}
}

/// A watch registered with a [`ShellChangeManager`], stopped on drop.
pub struct ShellWatcher {
	watch_id: WatchId,
	pidl: PidlAbsolute,
	filters: Filters,
	manager: Weak<Inner>,
}

impl ShellWatcher {
	#[must_use]
	pub const fn watch_id(&self) -> WatchId {
		self.watch_id
	}
}

impl DirectoryWatcher for ShellWatcher {
	fn pidl(&self) -> &PidlAbsolute {
		&self.pidl
	}

	fn filters(&self) -> Filters {
		self.filters
	}
}

impl Drop for ShellWatcher {
	fn drop(&mut self) {
		if let Some(inner) = self.manager.upgrade() {
			inner.state.lock().watches.remove(&self.watch_id);
		}
	}
}

#[derive(Clone)]
pub struct ShellWatcherFactory {
	manager: ShellChangeManager,
}

impl ShellWatcherFactory {
	#[must_use]
	pub const fn new(manager: ShellChangeManager) -> Self {
		Self { manager }
	}
}

impl DirectoryWatcherFactory for ShellWatcherFactory {
	fn maybe_create(
		&self,
		pidl: &PidlAbsolute,
		filters: Filters,
		callback: Callback,
		behavior: Behavior,
	) -> Option<Box<dyn DirectoryWatcher>> {
		Some(Box::new(self.manager.watch(pidl, filters, callback, behavior)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::Event;

	use sn_executor::ManualExecutor;
	use sn_shell::PidlChild;

	type Received = Arc<Mutex<Vec<(Event, PidlAbsolute, Option<PidlAbsolute>)>>>;

	fn pidl(names: &[&str]) -> PidlAbsolute {
		PidlAbsolute::from_items(names.iter().map(|name| PidlChild::new(*name)).collect())
	}

	fn recording_callback() -> (Callback, Received) {
		let received = Received::default();
		let callback: Callback = {
			let received = Arc::clone(&received);
			Arc::new(move |event, pidl1, pidl2| {
				received.lock().push((event, pidl1.clone(), pidl2.cloned()));
			})
		};

		(callback, received)
	}

	fn setup() -> (Arc<ManualExecutor>, ShellChangeManager) {
		let executor = Arc::new(ManualExecutor::new());
		let manager = ShellChangeManager::new(Arc::clone(&executor) as Arc<dyn Executor>);

		(executor, manager)
	}

	#[test]
	fn changes_are_batched_into_one_flush() {
		let (executor, manager) = setup();
		let (callback, received) = recording_callback();
		let _watcher = manager.watch(&pidl(&["folder"]), Filters::ALL, callback, Behavior::NonRecursive);

		manager.notify(ShellChange::created(pidl(&["folder", "a"]), false));
		manager.notify(ShellChange::removed(pidl(&["folder", "b"]), true));

		assert!(received.lock().is_empty());
		assert_eq!(executor.len(), 1);

		executor.run_all();
		assert_eq!(
			*received.lock(),
			vec![
				(Event::Added, pidl(&["folder", "a"]), None),
				(Event::Removed, pidl(&["folder", "b"]), None),
			]
		);
	}

	#[test]
	fn matching_follows_behavior_and_filters() {
		let (executor, manager) = setup();
		let (flat_callback, flat) = recording_callback();
		let (deep_callback, deep) = recording_callback();
		let (folders_callback, folders) = recording_callback();

		let _flat = manager.watch(&pidl(&["a"]), Filters::ALL, flat_callback, Behavior::NonRecursive);
		let _deep = manager.watch(&pidl(&["a"]), Filters::ALL, deep_callback, Behavior::Recursive);
		let _folders = manager.watch(
			&pidl(&["a"]),
			Filters::DIRECTORY_ADDED,
			folders_callback,
			Behavior::NonRecursive,
		);

		manager.notify(ShellChange::created(pidl(&["a", "b", "c"]), false));
		manager.notify(ShellChange::created(pidl(&["a", "file"]), false));
		manager.notify(ShellChange::created(pidl(&["a", "dir"]), true));
		manager.notify(ShellChange::updated(pidl(&["a"])));
		manager.notify(ShellChange::created(pidl(&["elsewhere"]), true));
		executor.run_all();

		assert_eq!(flat.lock().len(), 3);
		assert_eq!(deep.lock().len(), 4);
		assert_eq!(*folders.lock(), vec![(Event::Added, pidl(&["a", "dir"]), None)]);
	}

	#[test]
	fn renames_match_either_name() {
		let (executor, manager) = setup();
		let (callback, received) = recording_callback();
		let _watcher = manager.watch(&pidl(&["dest"]), Filters::ALL, callback, Behavior::NonRecursive);

		manager.notify(ShellChange::renamed(
			pidl(&["source", "item"]),
			pidl(&["dest", "item"]),
			false,
		));
		executor.run_all();

		assert_eq!(
			*received.lock(),
			vec![(
				Event::Renamed,
				pidl(&["source", "item"]),
				Some(pidl(&["dest", "item"]))
			)]
		);
	}

	#[test]
	fn watch_stopped_before_flush_receives_nothing() {
		let (executor, manager) = setup();
		let (callback, received) = recording_callback();
		let watcher = manager.watch(&pidl(&["a"]), Filters::ALL, callback, Behavior::NonRecursive);

		manager.notify(ShellChange::created(pidl(&["a", "b"]), false));
		drop(watcher);
		assert_eq!(manager.num_watches(), 0);

		executor.run_all();
		assert!(received.lock().is_empty());
	}

	#[test]
	fn callbacks_may_start_and_stop_watches() {
		let (executor, manager) = setup();
		let started = Arc::new(Mutex::new(Vec::new()));

		let callback: Callback = {
			let manager = manager.clone();
			let started = Arc::clone(&started);
			Arc::new(move |_, pidl1, _| {
				let (nested, _) = recording_callback();
				started
					.lock()
					.push(manager.watch(pidl1, Filters::ALL, nested, Behavior::NonRecursive));
			})
		};
		let _watcher = manager.watch(&pidl(&["a"]), Filters::ALL, callback, Behavior::NonRecursive);

		manager.notify(ShellChange::created(pidl(&["a", "b"]), true));
		executor.run_all();

		assert_eq!(manager.num_watches(), 2);
		started.lock().clear();
		assert_eq!(manager.num_watches(), 1);
	}
}
