use std::{
	fmt,
	hash::{Hash, Hasher},
	ops::Add,
	path::{Component, Path, PathBuf, MAIN_SEPARATOR},
	time::SystemTime,
};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
	/// Attributes of a namespace item, as reported by a [`crate::ShellNamespace`].
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
	#[serde(transparent)]
	pub struct Attributes: u32 {
		const FOLDER    = 1 << 0;
		const HIDDEN    = 1 << 1;
		const LINK      = 1 << 2;
		const READ_ONLY = 1 << 3;
		const SYSTEM    = 1 << 4;
	}
}

/// Metadata cached inside a full item id. Simple ids, like the ones produced by change
/// notifications, carry none.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemMetadata {
	pub attributes: Attributes,
	pub size: u64,
	pub modified: Option<SystemTime>,
}

impl ItemMetadata {
	#[must_use]
	pub const fn with_attributes(attributes: Attributes) -> Self {
		Self {
			attributes,
			size: 0,
			modified: None,
		}
	}
}

/// A single item id, relative to its parent.
///
/// Two ids are equal when their names are equal, whatever metadata they carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PidlChild {
	name: String,
	metadata: Option<ItemMetadata>,
}

impl PidlChild {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			metadata: None,
		}
	}

	pub fn with_metadata(name: impl Into<String>, metadata: ItemMetadata) -> Self {
		Self {
			name: name.into(),
			metadata: Some(metadata),
		}
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub const fn metadata(&self) -> Option<&ItemMetadata> {
		self.metadata.as_ref()
	}

	#[must_use]
	pub fn without_metadata(&self) -> Self {
		Self::new(self.name.clone())
	}
}

impl PartialEq for PidlChild {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
	}
}

impl Eq for PidlChild {}

impl Hash for PidlChild {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.name.hash(state);
	}
}

/// An absolute item id: the path of item ids leading from the namespace root to an item.
///
/// The empty pidl is the namespace root itself. For file system items the first item id is
/// the file system root (`/` or a drive such as `C:\`) and every following id is a path
/// component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PidlAbsolute {
	items: Vec<PidlChild>,
}

impl PidlAbsolute {
	#[must_use]
	pub const fn root() -> Self {
		Self { items: Vec::new() }
	}

	#[must_use]
	pub fn from_items(items: Vec<PidlChild>) -> Self {
		Self { items }
	}

	/// Builds a simple pidl from a path, lexically resolving `.` and `..` components.
	pub fn from_path(path: impl AsRef<Path>) -> Self {
		let mut items = Vec::new();
		let mut root = String::new();

		for component in path.as_ref().components() {
			match component {
				Component::Prefix(prefix) => root.push_str(&prefix.as_os_str().to_string_lossy()),
				Component::RootDir => root.push(MAIN_SEPARATOR),
				Component::CurDir => {}
				Component::ParentDir => {
					if items.len() > 1 {
						items.pop();
					}
				}
				Component::Normal(name) => {
					if !root.is_empty() {
						items.push(PidlChild::new(std::mem::take(&mut root)));
					}
					items.push(PidlChild::new(name.to_string_lossy()));
				}
			}
		}

		if !root.is_empty() {
			items.push(PidlChild::new(root));
		}

		Self { items }
	}

	#[must_use]
	pub fn is_root(&self) -> bool {
		self.items.is_empty()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.items.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	#[must_use]
	pub fn items(&self) -> &[PidlChild] {
		&self.items
	}

	#[must_use]
	pub fn last_item(&self) -> Option<&PidlChild> {
		self.items.last()
	}

	#[must_use]
	pub fn parent(&self) -> Option<Self> {
		let (_, parent) = self.items.split_last()?;

		Some(Self {
			items: parent.to_vec(),
		})
	}

	#[must_use]
	pub fn join(&self, child: PidlChild) -> Self {
		let mut items = Vec::with_capacity(self.items.len() + 1);
		items.extend_from_slice(&self.items);
		items.push(child);

		Self { items }
	}

	/// Replaces the last item id, keeping the ancestors.
	#[must_use]
	pub fn with_last_item(&self, child: PidlChild) -> Self {
		let mut items = self.items.clone();
		match items.last_mut() {
			Some(last) => *last = child,
			None => items.push(child),
		}

		Self { items }
	}

	/// Whether `self` is the immediate parent of `other`.
	#[must_use]
	pub fn is_parent(&self, other: &Self) -> bool {
		other.items.len() == self.items.len() + 1 && other.items.starts_with(&self.items)
	}

	/// Whether `self` is `other` or one of its ancestors.
	#[must_use]
	pub fn is_ancestor(&self, other: &Self) -> bool {
		other.items.starts_with(&self.items)
	}

	/// Strips all cached metadata, yielding the equivalent simple pidl.
	#[must_use]
	pub fn without_metadata(&self) -> Self {
		Self {
			items: self.items.iter().map(PidlChild::without_metadata).collect(),
		}
	}

	/// Re-roots the part of `self` below `old_ancestor` onto `new_ancestor`.
	#[must_use]
	pub fn rebase(&self, old_ancestor: &Self, new_ancestor: &Self) -> Option<Self> {
		if !old_ancestor.is_ancestor(self) {
			return None;
		}

		let mut items = new_ancestor.items.clone();
		items.extend_from_slice(&self.items[old_ancestor.items.len()..]);

		Some(Self { items })
	}

	/// The file system path of this pidl, if the first item id is a file system root.
	#[must_use]
	pub fn to_path(&self) -> Option<PathBuf> {
		let (first, rest) = self.items.split_first()?;
		let root = Path::new(first.name());
		if !root.has_root() {
			return None;
		}

		let mut path = root.to_path_buf();
		path.extend(rest.iter().map(PidlChild::name));

		Some(path)
	}
}

impl Add<PidlChild> for &PidlAbsolute {
	type Output = PidlAbsolute;

	fn add(self, child: PidlChild) -> PidlAbsolute {
		self.join(child)
	}
}

impl From<Vec<PidlChild>> for PidlAbsolute {
	fn from(items: Vec<PidlChild>) -> Self {
		Self { items }
	}
}

impl fmt::Display for PidlAbsolute {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(path) = self.to_path() {
			return write!(f, "{}", path.display());
		}

		if self.items.is_empty() {
			return write!(f, "::");
		}

		for item in &self.items {
			write!(f, "::{}", item.name())?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pidl(names: &[&str]) -> PidlAbsolute {
		names.iter().map(|name| PidlChild::new(*name)).collect::<Vec<_>>().into()
	}

	#[test]
	fn metadata_does_not_affect_equality() {
		let simple = pidl(&["/", "home", "a.txt"]);
		let full = pidl(&["/", "home"]).join(PidlChild::with_metadata(
			"a.txt",
			ItemMetadata::with_attributes(Attributes::HIDDEN),
		));

		assert_eq!(simple, full);
		assert_eq!(full.without_metadata().last_item().and_then(PidlChild::metadata), None);
	}

	#[test]
	fn parent_and_ancestor_relations() {
		let root = PidlAbsolute::root();
		let home = pidl(&["/", "home"]);
		let file = pidl(&["/", "home", "a.txt"]);

		assert!(home.is_parent(&file));
		assert!(!root.is_parent(&file));
		assert!(root.is_ancestor(&file));
		assert!(file.is_ancestor(&file));
		assert!(!file.is_parent(&file));
		assert!(!file.is_ancestor(&home));

		assert_eq!(file.parent(), Some(home));
		assert_eq!(root.parent(), None);
	}

	#[cfg(unix)]
	#[test]
	fn path_conversion() {
		let from_path = PidlAbsolute::from_path("/home/user/../docs/./a.txt");

		assert_eq!(from_path, pidl(&["/", "home", "docs", "a.txt"]));
		assert_eq!(from_path.to_path(), Some(PathBuf::from("/home/docs/a.txt")));
		assert_eq!(PidlAbsolute::from_path("/"), pidl(&["/"]));
		assert_eq!(PidlAbsolute::root().to_path(), None);
		assert_eq!(pidl(&["virtual", "item"]).to_path(), None);
	}

	#[test]
	fn rebase_moves_descendants() {
		let old = pidl(&["/", "a"]);
		let new = pidl(&["/", "b"]);

		assert_eq!(
			pidl(&["/", "a", "c", "d"]).rebase(&old, &new),
			Some(pidl(&["/", "b", "c", "d"]))
		);
		assert_eq!(pidl(&["/", "x"]).rebase(&old, &new), None);
	}
}
