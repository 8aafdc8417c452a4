//! macOS-specific event handler
//!
//! FSEvents reports both sides of a rename as `Name(Any)` with no way to correlate them.
//! A path that no longer exists is an old name and waits for its new name; a path that
//! exists is either the new name of the last pending rename or an item moved in.

use crate::{
	event::{FsEvent, RawEventKind, RawNotifyEvent, RenameHalf},
	platform::{normalize_simple, EventHandler, PendingRenames, HUNDRED_MILLIS},
};

use tracing::trace;

#[derive(Debug, Default)]
pub struct MacOsHandler {
	pending_renames: PendingRenames,
}

impl EventHandler for MacOsHandler {
	fn process(&mut self, event: RawNotifyEvent) -> Vec<FsEvent> {
		let RawEventKind::Rename(half) = event.kind else {
			return normalize_simple(&event).into_iter().collect();
		};

		let Some(path) = event.primary_path().cloned() else {
			return vec![];
		};

		if half == RenameHalf::Both {
			if let Some(to) = event.paths.get(1) {
				return vec![FsEvent::rename(path, to)];
			}
		}

		if path.symlink_metadata().is_err() {
			trace!(path = %path.display(), "Buffering old name of a rename;");
			self.pending_renames.push(path, None);
			return vec![];
		}

		match self.pending_renames.take_match(None) {
			Some(from) => vec![FsEvent::rename(from, path)],
			None => vec![FsEvent::create(path, None)],
		}
	}

	fn tick(&mut self) -> Vec<FsEvent> {
		self.pending_renames.evict(HUNDRED_MILLIS)
	}

	fn reset(&mut self) {
		self.pending_renames.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::event::ChangeKind;

	use std::{fs, thread, time::Duration};

	use tempfile::tempdir;

	fn rename_any(path: &std::path::Path) -> RawNotifyEvent {
		RawNotifyEvent {
			kind: RawEventKind::Rename(RenameHalf::Any),
			paths: vec![path.to_path_buf()],
			tracker: None,
		}
	}

	#[test]
	fn pairs_rename_halves_by_existence() {
		let dir = tempdir().unwrap();
		let old = dir.path().join("old.txt");
		let new = dir.path().join("new.txt");
		fs::write(&new, "moved").unwrap();

		let mut handler = MacOsHandler::default();
		assert!(handler.process(rename_any(&old)).is_empty());

		let events = handler.process(rename_any(&new));
		assert_eq!(events.len(), 1);
		assert_eq!(events[0].kind, ChangeKind::Renamed);
		assert_eq!(events[0].path, old);
		assert_eq!(events[0].target.as_deref(), Some(new.as_path()));
		assert_eq!(events[0].is_directory, Some(false));
	}

	#[test]
	fn unmatched_halves() {
		let dir = tempdir().unwrap();
		let gone = dir.path().join("gone.txt");
		let arrived = dir.path().join("arrived.txt");
		fs::write(&arrived, "hello").unwrap();

		let mut handler = MacOsHandler::default();
		assert_eq!(
			handler.process(rename_any(&arrived)),
			vec![FsEvent::create(&arrived, None)]
		);

		assert!(handler.process(rename_any(&gone)).is_empty());
		thread::sleep(HUNDRED_MILLIS + Duration::from_millis(20));
		assert_eq!(handler.tick(), vec![FsEvent::remove(&gone, None)]);
	}
}
