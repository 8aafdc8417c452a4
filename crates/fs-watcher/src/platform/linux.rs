//! Linux-specific event handler
//!
//! inotify correlates both halves of a rename with a cookie, and notify follows a matched
//! `To` half with a combined `Both` event, so only halves that never get a counterpart
//! need buffering: those are moves into or out of the watched directory.

use crate::{
	event::{FsEvent, RawEventKind, RawNotifyEvent, RenameHalf},
	platform::{normalize_simple, EventHandler, PendingRenames, HUNDRED_MILLIS},
};

use tracing::trace;

#[derive(Debug, Default)]
pub struct LinuxHandler {
	pending_renames: PendingRenames,
}

impl EventHandler for LinuxHandler {
	fn process(&mut self, event: RawNotifyEvent) -> Vec<FsEvent> {
		let RawEventKind::Rename(half) = event.kind else {
			return normalize_simple(&event).into_iter().collect();
		};

		let Some(path) = event.primary_path().cloned() else {
			return vec![];
		};

		match half {
			RenameHalf::Both => {
				let Some(to) = event.paths.get(1).cloned() else {
					trace!(path = %path.display(), "Incomplete rename, treating as modify;");
					return vec![FsEvent::modify(path)];
				};

				if event
					.tracker
					.and_then(|tracker| self.pending_renames.take_match(Some(tracker)))
					.is_none()
				{
					self.pending_renames.take_path(&path);
				}

				vec![FsEvent::rename(path, to)]
			}
			RenameHalf::From => {
				self.pending_renames.push(path, event.tracker);
				vec![]
			}
			RenameHalf::To => {
				if event
					.tracker
					.is_some_and(|tracker| self.pending_renames.contains_tracker(tracker))
				{
					// The combined event follows
					vec![]
				} else {
					vec![FsEvent::create(path, None)]
				}
			}
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
