use std::{path::PathBuf, sync::Arc};

use bitflags::bitflags;
use notify::event::{AccessKind, AccessMode, CreateKind, ModifyKind, RemoveKind, RenameMode};
use serde::{Deserialize, Serialize};
use sn_shell::PidlAbsolute;

/// A change delivered to a [`crate::DirectoryWatcher`] callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
	Added,
	/// `pidl1` is the old name, `pidl2` the new one.
	Renamed,
	Modified,
	Removed,
	/// Changes were lost and the directory should be considered stale.
	DirectoryContentsChanged,
}

bitflags! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
	#[serde(transparent)]
	pub struct Filters: u32 {
		const FILE_ADDED        = 1 << 0;
		const FILE_RENAMED      = 1 << 1;
		const FILE_REMOVED      = 1 << 2;
		const DIRECTORY_ADDED   = 1 << 3;
		const DIRECTORY_RENAMED = 1 << 4;
		const DIRECTORY_REMOVED = 1 << 5;
		const MODIFIED          = 1 << 6;
		const ATTRIBUTES        = 1 << 7;

		const ALL = Self::FILE_ADDED.bits()
			| Self::FILE_RENAMED.bits()
			| Self::FILE_REMOVED.bits()
			| Self::DIRECTORY_ADDED.bits()
			| Self::DIRECTORY_RENAMED.bits()
			| Self::DIRECTORY_REMOVED.bits()
			| Self::MODIFIED.bits()
			| Self::ATTRIBUTES.bits();
	}
}

impl Filters {
	/// Filters a change must intersect with to be delivered. `is_directory` is `None` when
	/// the source couldn't tell, in which case either flavour admits the change.
	#[must_use]
	pub const fn required_for(change: ChangeKind, is_directory: Option<bool>) -> Self {
		let (file, directory) = match change {
			ChangeKind::Added => (Self::FILE_ADDED, Self::DIRECTORY_ADDED),
			ChangeKind::Renamed => (Self::FILE_RENAMED, Self::DIRECTORY_RENAMED),
			ChangeKind::Removed => (Self::FILE_REMOVED, Self::DIRECTORY_REMOVED),
			ChangeKind::Modified => return Self::MODIFIED,
			ChangeKind::Attributes => return Self::ATTRIBUTES,
			ChangeKind::ContentsChanged => return Self::ALL,
		};

		match is_directory {
			Some(true) => directory,
			Some(false) => file,
			None => file.union(directory),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Behavior {
	#[default]
	NonRecursive,
	Recursive,
}

pub type Callback = Arc<dyn Fn(Event, &PidlAbsolute, Option<&PidlAbsolute>) + Send + Sync>;

/// A change, with enough detail to pick the [`Filters`] that admit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
	Added,
	Renamed,
	Removed,
	Modified,
	Attributes,
	ContentsChanged,
}

impl ChangeKind {
	#[must_use]
	pub const fn event(self) -> Event {
		match self {
			Self::Added => Event::Added,
			Self::Renamed => Event::Renamed,
			Self::Removed => Event::Removed,
			Self::Modified | Self::Attributes => Event::Modified,
			Self::ContentsChanged => Event::DirectoryContentsChanged,
		}
	}
}

/// Normalized file system event, as produced by a platform event handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
	pub kind: ChangeKind,
	pub path: PathBuf,
	/// New path, for renames only.
	pub target: Option<PathBuf>,
	pub is_directory: Option<bool>,
}

impl FsEvent {
	pub fn create(path: impl Into<PathBuf>, is_directory: Option<bool>) -> Self {
		Self::new(ChangeKind::Added, path, is_directory)
	}

	pub fn remove(path: impl Into<PathBuf>, is_directory: Option<bool>) -> Self {
		Self::new(ChangeKind::Removed, path, is_directory)
	}

	pub fn modify(path: impl Into<PathBuf>) -> Self {
		Self::new(ChangeKind::Modified, path, None)
	}

	pub fn attributes(path: impl Into<PathBuf>) -> Self {
		Self::new(ChangeKind::Attributes, path, None)
	}

	pub fn rename(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
		let to = to.into();
		let is_directory = to.symlink_metadata().ok().map(|metadata| metadata.is_dir());

		Self {
			kind: ChangeKind::Renamed,
			path: from.into(),
			target: Some(to),
			is_directory,
		}
	}

	pub fn rescan(path: impl Into<PathBuf>) -> Self {
		Self::new(ChangeKind::ContentsChanged, path, Some(true))
	}

	fn new(kind: ChangeKind, path: impl Into<PathBuf>, is_directory: Option<bool>) -> Self {
		Self {
			kind,
			path: path.into(),
			target: None,
			is_directory,
		}
	}

	#[must_use]
	pub const fn required_filters(&self) -> Filters {
		Filters::required_for(self.kind, self.is_directory)
	}
}

/// Which half of a rename a raw event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameHalf {
	From,
	To,
	Both,
	/// The backend can't tell (macOS).
	Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEventKind {
	Create { is_directory: Option<bool> },
	Remove { is_directory: Option<bool> },
	Modify,
	Attributes,
	Rename(RenameHalf),
	Rescan,
	Other(String),
}

/// A notify event stripped down to what the platform handlers look at.
#[derive(Debug, Clone)]
pub struct RawNotifyEvent {
	pub kind: RawEventKind,
	pub paths: Vec<PathBuf>,
	/// Correlates the halves of a rename, when the backend provides it.
	pub tracker: Option<usize>,
}

impl RawNotifyEvent {
	#[must_use]
	pub fn primary_path(&self) -> Option<&PathBuf> {
		self.paths.first()
	}
}

impl From<notify::Event> for RawNotifyEvent {
	fn from(event: notify::Event) -> Self {
		use notify::EventKind;

		let kind = if event.need_rescan() {
			RawEventKind::Rescan
		} else {
			match event.kind {
				EventKind::Create(kind) => RawEventKind::Create {
					is_directory: match kind {
						CreateKind::Folder => Some(true),
						CreateKind::File => Some(false),
						_ => None,
					},
				},
				EventKind::Remove(kind) => RawEventKind::Remove {
					is_directory: match kind {
						RemoveKind::Folder => Some(true),
						RemoveKind::File => Some(false),
						_ => None,
					},
				},
				EventKind::Modify(ModifyKind::Name(mode)) => RawEventKind::Rename(match mode {
					RenameMode::From => RenameHalf::From,
					RenameMode::To => RenameHalf::To,
					RenameMode::Both => RenameHalf::Both,
					RenameMode::Any | RenameMode::Other => RenameHalf::Any,
				}),
				EventKind::Modify(ModifyKind::Metadata(_)) => RawEventKind::Attributes,
				EventKind::Modify(_) | EventKind::Access(AccessKind::Close(AccessMode::Write)) => {
					RawEventKind::Modify
				}
				other => RawEventKind::Other(format!("{other:?}")),
			}
		};

		Self {
			tracker: event.tracker(),
			paths: event.paths,
			kind,
		}
	}
}
