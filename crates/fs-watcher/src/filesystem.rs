use crate::{
	event::{ChangeKind, FsEvent, RawNotifyEvent},
	platform::{EventHandler, PlatformHandler, HUNDRED_MILLIS},
	Behavior, Callback, DirectoryWatcher, DirectoryWatcherFactory, Filters, WatcherError,
};

use std::{
	path::PathBuf,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Weak,
	},
};

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use sn_executor::Executor;
use sn_shell::{CancellationToken, PidlAbsolute};
use tokio::{
	runtime::Handle,
	time::{interval_at, Instant, MissedTickBehavior},
};
use tokio_util::sync::DropGuard;
use tracing::{error, trace, warn};

struct WatchState {
	pidl: PidlAbsolute,
	path: PathBuf,
	filters: Filters,
	callback: Callback,
	original_executor: Arc<dyn Executor>,
	handler: Mutex<PlatformHandler>,
	is_alive: AtomicBool,
}

impl WatchState {
	fn handle_notify_result(self: &Arc<Self>, result: notify::Result<notify::Event>) {
		if !self.is_alive.load(Ordering::Acquire) {
			return;
		}

		let events = match result {
			Ok(event) => {
				trace!(?event, "Received raw event;");
				self.handler.lock().process(RawNotifyEvent::from(event))
			}
			Err(e) => {
				error!(?e, path = %self.path.display(), "Watcher error, changes may be lost;");
				self.handler.lock().reset();
				vec![FsEvent::rescan(&self.path)]
			}
		};

		self.deliver(events);
	}

	fn tick(self: &Arc<Self>) {
		if !self.is_alive.load(Ordering::Acquire) {
			return;
		}

		let events = self.handler.lock().tick();
		self.deliver(events);
	}

	fn deliver(self: &Arc<Self>, events: Vec<FsEvent>) {
		for event in events {
			if !event.required_filters().intersects(self.filters) {
				trace!(?event, "Event filtered out;");
				continue;
			}

			let pidl1 = if event.kind == ChangeKind::ContentsChanged {
				self.pidl.clone()
			} else {
				PidlAbsolute::from_path(&event.path)
			};
			let pidl2 = event.target.as_ref().map(PidlAbsolute::from_path);
			let kind = event.kind.event();

			let state = Arc::clone(self);
			self.original_executor.post(Box::new(move || {
				if state.is_alive.load(Ordering::Acquire) {
					(state.callback)(kind, &pidl1, pidl2.as_ref());
				}
			}));
		}
	}
}

/// Watches a file system directory with the platform's native backend.
pub struct FileSystemWatcher {
	state: Arc<WatchState>,
	_watcher: RecommendedWatcher,
}

impl DirectoryWatcher for FileSystemWatcher {
	fn pidl(&self) -> &PidlAbsolute {
		&self.state.pidl
	}

	fn filters(&self) -> Filters {
		self.state.filters
	}
}

impl Drop for FileSystemWatcher {
	fn drop(&mut self) {
		self.state.is_alive.store(false, Ordering::Release);
	}
}

/// Drives [`EventHandler::tick`] for every live watcher of a factory, so buffered rename
/// halves are flushed even when no further events arrive. Stops when dropped.
struct Ticker {
	watches: Arc<Mutex<Vec<Weak<WatchState>>>>,
	_stop: DropGuard,
}

impl Ticker {
	fn spawn(runtime: &Handle) -> Self {
		let watches = Arc::new(Mutex::new(Vec::<Weak<WatchState>>::new()));
		let stop = CancellationToken::new();

		runtime.spawn({
			let watches = Arc::clone(&watches);
			let stop = stop.clone();

			async move {
				let mut tick_interval = interval_at(Instant::now() + HUNDRED_MILLIS, HUNDRED_MILLIS);
				tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

				loop {
					tokio::select! {
						() = stop.cancelled() => break,
						_ = tick_interval.tick() => Self::tick_all(&watches),
					}
				}

				trace!("Watcher ticker shutting down;");
			}
		});

		Self {
			watches,
			_stop: stop.drop_guard(),
		}
	}

	fn tick_all(watches: &Mutex<Vec<Weak<WatchState>>>) {
		let live = {
			let mut watches = watches.lock();
			watches.retain(|watch| watch.strong_count() > 0);
			watches.iter().filter_map(Weak::upgrade).collect::<Vec<_>>()
		};

		for watch in live {
			watch.tick();
		}
	}
}

/// Creates [`FileSystemWatcher`]s delivering to one original executor.
///
/// Unmatched rename halves are flushed by a task on `runtime`.
pub struct FileSystemWatcherFactory {
	original_executor: Arc<dyn Executor>,
	ticker: Ticker,
}

impl FileSystemWatcherFactory {
	pub fn new(original_executor: Arc<dyn Executor>, runtime: &Handle) -> Self {
		Self {
			original_executor,
			ticker: Ticker::spawn(runtime),
		}
	}

	pub fn watch(
		&self,
		pidl: &PidlAbsolute,
		filters: Filters,
		callback: Callback,
		behavior: Behavior,
	) -> Result<FileSystemWatcher, WatcherError> {
		let path = pidl
			.to_path()
			.ok_or_else(|| WatcherError::NotFileSystem(pidl.clone()))?;

		let state = Arc::new(WatchState {
			pidl: pidl.clone(),
			path: path.clone(),
			filters,
			callback,
			original_executor: Arc::clone(&self.original_executor),
			handler: Mutex::new(PlatformHandler::default()),
			is_alive: AtomicBool::new(true),
		});

		let mut watcher = RecommendedWatcher::new(
			{
				let state = Arc::downgrade(&state);
				move |result| {
					if let Some(state) = state.upgrade() {
						state.handle_notify_result(result);
					}
				}
			},
			Config::default(),
		)?;

		let mode = match behavior {
			Behavior::NonRecursive => RecursiveMode::NonRecursive,
			Behavior::Recursive => RecursiveMode::Recursive,
		};

		watcher
			.watch(&path, mode)
			.map_err(|source| WatcherError::Watch {
				path: path.clone(),
				source,
			})?;

		self.ticker.watches.lock().push(Arc::downgrade(&state));

		trace!(path = %path.display(), ?filters, ?behavior, "Watching directory;");

		Ok(FileSystemWatcher {
			state,
			_watcher: watcher,
		})
	}
}

impl DirectoryWatcherFactory for FileSystemWatcherFactory {
	fn maybe_create(
		&self,
		pidl: &PidlAbsolute,
		filters: Filters,
		callback: Callback,
		behavior: Behavior,
	) -> Option<Box<dyn DirectoryWatcher>> {
		match self.watch(pidl, filters, callback, behavior) {
			Ok(watcher) => Some(Box::new(watcher)),
			Err(e) => {
				warn!(?e, %pidl, "Unable to watch location;");
				None
			}
		}
	}
}
