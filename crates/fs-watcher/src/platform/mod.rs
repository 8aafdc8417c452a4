//! Per-platform normalisation of raw notify events.
//!
//! Every backend reports renames differently: inotify pairs the halves with a cookie and
//! also emits a combined event, Windows emits the halves back to back, and FSEvents only
//! says "something was renamed" for each path involved. The handlers here turn all of
//! that into [`FsEvent`]s, buffering unmatched halves until [`EventHandler::tick`] gives
//! up on them.

use crate::event::{FsEvent, RawEventKind, RawNotifyEvent};

use std::{
	path::{Path, PathBuf},
	time::{Duration, Instant},
};

use tracing::trace;

mod linux;
mod macos;
mod windows;

pub use linux::LinuxHandler;
pub use macos::MacOsHandler;
pub use windows::WindowsHandler;

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub type PlatformHandler = MacOsHandler;

#[cfg(target_os = "windows")]
pub type PlatformHandler = WindowsHandler;

#[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "windows")))]
pub type PlatformHandler = LinuxHandler;

/// How long an unmatched rename half waits for its counterpart.
pub const HUNDRED_MILLIS: Duration = Duration::from_millis(100);

pub trait EventHandler: Send + Default {
	fn process(&mut self, event: RawNotifyEvent) -> Vec<FsEvent>;

	/// Flushes buffered events that waited long enough.
	fn tick(&mut self) -> Vec<FsEvent>;

	fn reset(&mut self);
}

/// Events every backend reports the same way. Renames are left to the handlers.
pub(crate) fn normalize_simple(event: &RawNotifyEvent) -> Option<FsEvent> {
	let path = event.primary_path()?.clone();

	match &event.kind {
		RawEventKind::Create { is_directory } => Some(FsEvent::create(path, *is_directory)),
		RawEventKind::Remove { is_directory } => Some(FsEvent::remove(path, *is_directory)),
		RawEventKind::Modify => Some(FsEvent::modify(path)),
		RawEventKind::Attributes => Some(FsEvent::attributes(path)),
		RawEventKind::Rescan => Some(FsEvent::rescan(path)),
		RawEventKind::Rename(_) => None,
		RawEventKind::Other(kind) => {
			trace!(%kind, "Ignoring unknown event kind;");
			None
		}
	}
}

#[derive(Debug, Clone)]
pub(crate) struct InstantAndPath {
	pub instant: Instant,
	pub path: PathBuf,
	pub tracker: Option<usize>,
}

/// Old names of renames still waiting for their new name.
#[derive(Debug, Default)]
pub(crate) struct PendingRenames {
	from: Vec<InstantAndPath>,
}

impl PendingRenames {
	pub fn push(&mut self, path: PathBuf, tracker: Option<usize>) {
		self.from.push(InstantAndPath {
			instant: Instant::now(),
			path,
			tracker,
		});
	}

	/// Takes the most recent pending old name, or the one with a matching tracker when
	/// the backend provides one.
	pub fn take_match(&mut self, tracker: Option<usize>) -> Option<PathBuf> {
		let index = match tracker {
			Some(tracker) => self
				.from
				.iter()
				.rposition(|pending| pending.tracker == Some(tracker))?,
			None => self.from.len().checked_sub(1)?,
		};

		Some(self.from.remove(index).path)
	}

	pub fn take_path(&mut self, path: &Path) -> bool {
		let before = self.from.len();
		self.from.retain(|pending| pending.path != path);

		before != self.from.len()
	}

	pub fn contains_tracker(&self, tracker: usize) -> bool {
		self.from
			.iter()
			.any(|pending| pending.tracker == Some(tracker))
	}

	/// Unmatched old names older than `timeout`: the item left the watched directory.
	pub fn evict(&mut self, timeout: Duration) -> Vec<FsEvent> {
		let mut evicted = Vec::new();
		self.from.retain(|pending| {
			if pending.instant.elapsed() > timeout {
				evicted.push(FsEvent::remove(pending.path.clone(), None));
				false
			} else {
				true
			}
		});

		evicted
	}

	pub fn clear(&mut self) {
		self.from.clear();
	}
}
