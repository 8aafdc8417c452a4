use crate::{
	Attributes, DisplayNameKind, FileIOError, HiddenItemPolicy, ItemMetadata, ItemType,
	NamespaceError, PidlAbsolute, PidlChild, PidlUpdater, ShellEnumerator, ShellItemFilter,
	ShellNamespace,
};

use std::{
	fs::{self, Metadata},
	path::{Path, PathBuf},
};

use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

/// Namespace backed by the local file system.
///
/// The namespace root contains the file system roots: `/` on unix-like systems, the
/// mounted drives on Windows.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemNamespace;

impl FileSystemNamespace {
	#[must_use]
	pub const fn new() -> Self {
		Self
	}

	fn path_for(pidl: &PidlAbsolute) -> Result<PathBuf, NamespaceError> {
		pidl.to_path()
			.ok_or_else(|| NamespaceError::NotFileSystem(pidl.clone()))
	}

	/// Full item id for `path`, with freshly read metadata.
	pub fn item_for_path(path: impl AsRef<Path>) -> Result<PidlChild, NamespaceError> {
		let path = path.as_ref();
		let name = path
			.file_name()
			.map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy())
			.into_owned();

		Ok(PidlChild::with_metadata(name, read_metadata(path)?))
	}

	fn roots() -> Vec<PidlChild> {
		#[cfg(windows)]
		{
			(b'A'..=b'Z')
				.map(|letter| format!("{}:\\", char::from(letter)))
				.filter(|drive| Path::new(drive).exists())
				.map(|drive| {
					PidlChild::with_metadata(drive, ItemMetadata::with_attributes(Attributes::FOLDER))
				})
				.collect()
		}

		#[cfg(not(windows))]
		{
			vec![PidlChild::with_metadata(
				std::path::MAIN_SEPARATOR_STR,
				ItemMetadata::with_attributes(Attributes::FOLDER),
			)]
		}
	}
}

fn read_metadata(path: &Path) -> Result<ItemMetadata, NamespaceError> {
	let link_metadata =
		fs::symlink_metadata(path).map_err(|e| FileIOError::from((path, e)))?;

	let mut attributes = Attributes::empty();
	let metadata = if link_metadata.is_symlink() {
		attributes |= Attributes::LINK;
		// A dangling link is still an item, just not a folder
		fs::metadata(path).unwrap_or(link_metadata)
	} else {
		link_metadata
	};

	attributes |= attributes_from_metadata(path, &metadata);

	Ok(ItemMetadata {
		attributes,
		size: metadata.len(),
		modified: metadata.modified().ok(),
	})
}

#[cfg_attr(windows, allow(unused_variables))]
fn attributes_from_metadata(path: &Path, metadata: &Metadata) -> Attributes {
	let mut attributes = Attributes::empty();

	if metadata.is_dir() {
		attributes |= Attributes::FOLDER;
	}

	if metadata.permissions().readonly() {
		attributes |= Attributes::READ_ONLY;
	}

	#[cfg(windows)]
	{
		use std::os::windows::fs::MetadataExt;

		const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
		const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;

		let raw = metadata.file_attributes();
		if raw & FILE_ATTRIBUTE_HIDDEN != 0 {
			attributes |= Attributes::HIDDEN;
		}
		if raw & FILE_ATTRIBUTE_SYSTEM != 0 {
			attributes |= Attributes::SYSTEM;
		}
	}

	#[cfg(not(windows))]
	{
		let is_dot_file = path
			.file_name()
			.and_then(|name| name.to_str())
			.is_some_and(|name| name.starts_with('.'));
		if is_dot_file {
			attributes |= Attributes::HIDDEN;
		}
	}

	attributes
}

impl ShellNamespace for FileSystemNamespace {
	fn attributes(&self, pidl: &PidlAbsolute) -> Result<Attributes, NamespaceError> {
		if pidl.is_root() {
			return Ok(Attributes::FOLDER);
		}

		read_metadata(&Self::path_for(pidl)?).map(|metadata| metadata.attributes)
	}

	fn display_name(
		&self,
		pidl: &PidlAbsolute,
		kind: DisplayNameKind,
	) -> Result<String, NamespaceError> {
		let Some(last) = pidl.last_item() else {
			return Ok(String::from("Computer"));
		};

		match kind {
			DisplayNameKind::InFolder => Ok(last.name().to_owned()),
			DisplayNameKind::ForParsing => Self::path_for(pidl)
				.map(|path| path.to_string_lossy().into_owned()),
		}
	}

	fn parse_display_name(&self, name: &str) -> Result<PidlAbsolute, NamespaceError> {
		let path = Path::new(name);
		if !path.has_root() {
			return Err(NamespaceError::ParseDisplayName(name.to_owned()));
		}

		let simple = PidlAbsolute::from_path(path);
		let Some(resolved) = simple.to_path() else {
			return Err(NamespaceError::ParseDisplayName(name.to_owned()));
		};

		Ok(simple.with_last_item(Self::item_for_path(resolved)?))
	}

	fn link_target(&self, pidl: &PidlAbsolute) -> Result<Option<PidlAbsolute>, NamespaceError> {
		if pidl.is_root() {
			return Ok(None);
		}

		let path = Self::path_for(pidl)?;
		let metadata = fs::symlink_metadata(&path).map_err(|e| FileIOError::from((&path, e)))?;
		if !metadata.is_symlink() {
			return Ok(None);
		}

		let target = fs::read_link(&path)
			.map_err(|e| FileIOError::from((&path, e, "Failed to read link target")))?;

		let target = if target.is_relative() {
			path.parent().map_or(target.clone(), |parent| parent.join(&target))
		} else {
			target
		};

		trace!(link = %path.display(), target = %target.display(), "Resolved link;");

		Ok(Some(PidlAbsolute::from_path(target)))
	}
}

impl ShellEnumerator for FileSystemNamespace {
	fn enumerate_directory(
		&self,
		pidl: &PidlAbsolute,
		item_type: ItemType,
		hidden_item_policy: HiddenItemPolicy,
		stop: &CancellationToken,
	) -> Result<Vec<PidlChild>, NamespaceError> {
		let filter = ShellItemFilter::new(item_type, hidden_item_policy);

		if pidl.is_root() {
			return Ok(Self::roots()
				.into_iter()
				.filter(|root| {
					root.metadata()
						.is_some_and(|metadata| filter.should_include(metadata.attributes))
				})
				.collect());
		}

		let path = Self::path_for(pidl)?;
		let read_dir = fs::read_dir(&path)
			.map_err(|e| FileIOError::from((&path, e, "Failed to read directory")))?;

		let mut items = Vec::new();
		for entry in read_dir {
			if stop.is_cancelled() {
				return Err(NamespaceError::Stopped);
			}

			let entry = match entry {
				Ok(entry) => entry,
				Err(e) => {
					warn!(?e, path = %path.display(), "Failed to read directory entry;");
					continue;
				}
			};

			let entry_path = entry.path();
			let metadata = match read_metadata(&entry_path) {
				Ok(metadata) => metadata,
				Err(e) => {
					// Usually a race with a concurrent removal
					trace!(?e, "Skipping entry without metadata;");
					continue;
				}
			};

			if !filter.should_include(metadata.attributes) {
				continue;
			}

			items.push(PidlChild::with_metadata(
				entry.file_name().to_string_lossy(),
				metadata,
			));
		}

		Ok(items)
	}
}

impl PidlUpdater for FileSystemNamespace {
	fn get_updated_pidl(&self, simple: &PidlAbsolute) -> PidlAbsolute {
		let Some(last) = simple.last_item() else {
			return simple.clone();
		};

		let Some(path) = simple.to_path() else {
			return simple.clone();
		};

		match read_metadata(&path) {
			Ok(metadata) => simple.with_last_item(PidlChild::with_metadata(last.name(), metadata)),
			Err(e) => {
				warn!(?e, pidl = %simple, "Failed to refresh item metadata, keeping stale pidl;");
				simple.clone()
			}
		}
	}
}
