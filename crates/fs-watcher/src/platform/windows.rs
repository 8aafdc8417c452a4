//! Windows-specific event handler
//!
//! `ReadDirectoryChangesW` reports a rename as a `From` half immediately followed by a
//! `To` half. A `From` without a `To` means the item was moved out of the watched
//! directory, so it's only reported as removed once it waited long enough.

use crate::{
	event::{FsEvent, RawEventKind, RawNotifyEvent, RenameHalf},
	platform::{normalize_simple, EventHandler, PendingRenames, HUNDRED_MILLIS},
};

#[derive(Debug, Default)]
pub struct WindowsHandler {
	pending_renames: PendingRenames,
}

impl EventHandler for WindowsHandler {
	fn process(&mut self, event: RawNotifyEvent) -> Vec<FsEvent> {
		let RawEventKind::Rename(half) = event.kind else {
			return normalize_simple(&event).into_iter().collect();
		};

		let Some(path) = event.primary_path().cloned() else {
			return vec![];
		};

		match half {
			RenameHalf::From => {
				self.pending_renames.push(path, event.tracker);
				vec![]
			}
			RenameHalf::To => match self.pending_renames.take_match(None) {
				Some(from) => vec![FsEvent::rename(from, path)],
				None => vec![FsEvent::create(path, None)],
			},
			RenameHalf::Both => match event.paths.get(1) {
				Some(to) => vec![FsEvent::rename(path, to)],
				None => vec![FsEvent::modify(path)],
			},
			RenameHalf::Any => {
				if path.exists() {
					vec![FsEvent::create(path, None)]
				} else {
					vec![FsEvent::remove(path, None)]
				}
			}
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

	use std::{path::PathBuf, thread, time::Duration};

	fn half(half: RenameHalf, path: &str) -> RawNotifyEvent {
		RawNotifyEvent {
			kind: RawEventKind::Rename(half),
			paths: vec![PathBuf::from(path)],
			tracker: None,
		}
	}

	#[test]
	fn from_then_to_is_a_rename() {
		let mut handler = WindowsHandler::default();

		assert!(handler.process(half(RenameHalf::From, r"C:\test\old.txt")).is_empty());
		let events = handler.process(half(RenameHalf::To, r"C:\test\new.txt"));

		assert_eq!(events.len(), 1);
		assert_eq!(events[0].path, PathBuf::from(r"C:\test\old.txt"));
		assert_eq!(events[0].target, Some(PathBuf::from(r"C:\test\new.txt")));
		assert!(handler.tick().is_empty());
	}

	#[test]
	fn lone_from_becomes_a_removal() {
		let mut handler = WindowsHandler::default();

		assert!(handler.process(half(RenameHalf::From, r"C:\test\old.txt")).is_empty());
		thread::sleep(HUNDRED_MILLIS + Duration::from_millis(20));

		assert_eq!(handler.tick(), vec![FsEvent::remove(r"C:\test\old.txt", None)]);

		handler.process(half(RenameHalf::From, r"C:\test\other.txt"));
		handler.reset();
		thread::sleep(HUNDRED_MILLIS + Duration::from_millis(20));
		assert!(handler.tick().is_empty());
	}
}
