use crate::{
	Attributes, DisplayNameKind, HiddenItemPolicy, ItemMetadata, ItemType, NamespaceError,
	PidlAbsolute, PidlChild, PidlUpdater, ShellEnumerator, ShellItemFilter, ShellNamespace,
};

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Debug, Clone)]
struct MemoryItem {
	attributes: Attributes,
	link_target: Option<PidlAbsolute>,
	children: Vec<String>,
}

impl MemoryItem {
	const fn new(attributes: Attributes) -> Self {
		Self {
			attributes,
			link_target: None,
			children: Vec::new(),
		}
	}
}

/// A namespace living entirely in memory.
///
/// Items are addressed by pidls without a file system root, so it can stand in for virtual
/// folders. Mutations only change the namespace; reporting them to watchers is up to the
/// caller.
#[derive(Debug)]
pub struct MemoryNamespace {
	items: RwLock<HashMap<PidlAbsolute, MemoryItem>>,
	failing_enumerations: RwLock<HashSet<PidlAbsolute>>,
}

impl Default for MemoryNamespace {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryNamespace {
	#[must_use]
	pub fn new() -> Self {
		Self {
			items: RwLock::new(HashMap::from([(
				PidlAbsolute::root(),
				MemoryItem::new(Attributes::FOLDER),
			)])),
			failing_enumerations: RwLock::default(),
		}
	}

	pub fn add_folder(&self, parent: &PidlAbsolute, name: &str) -> PidlAbsolute {
		self.add_item(parent, name, Attributes::FOLDER)
	}

	pub fn add_file(&self, parent: &PidlAbsolute, name: &str) -> PidlAbsolute {
		self.add_item(parent, name, Attributes::empty())
	}

	pub fn add_link(&self, parent: &PidlAbsolute, name: &str, target: &PidlAbsolute) -> PidlAbsolute {
		let pidl = self.add_item(parent, name, Attributes::LINK);
		if let Some(item) = self.items.write().get_mut(&pidl) {
			item.link_target = Some(target.without_metadata());
		}

		self.full_pidl(&pidl)
	}

	/// Adds an item with arbitrary attributes and returns its full pidl.
	///
	/// # Panics
	/// When `parent` doesn't exist, which is a bug in the calling test.
	#[allow(clippy::unwrap_used, clippy::missing_panics_doc)]
	pub fn add_item(&self, parent: &PidlAbsolute, name: &str, attributes: Attributes) -> PidlAbsolute {
		let parent = parent.without_metadata();
		let pidl = parent.join(PidlChild::new(name));

		{
			let mut items = self.items.write();
			let parent_item = items.get_mut(&parent).unwrap();
			if !parent_item.children.iter().any(|child| child == name) {
				parent_item.children.push(name.to_owned());
			}
			items.insert(pidl.clone(), MemoryItem::new(attributes));
		}

		trace!(%pidl, ?attributes, "Added memory item;");

		self.full_pidl(&pidl)
	}

	/// Renames an item in place, moving its whole subtree. Returns the new full pidl.
	pub fn rename_item(&self, pidl: &PidlAbsolute, new_name: &str) -> Option<PidlAbsolute> {
		let old = pidl.without_metadata();
		let parent = old.parent()?;
		let old_name = old.last_item()?.name().to_owned();
		let new = parent.join(PidlChild::new(new_name));

		{
			let mut items = self.items.write();
			if !items.contains_key(&old) {
				return None;
			}

			let moved = items
				.keys()
				.filter(|key| old.is_ancestor(key))
				.cloned()
				.collect::<Vec<_>>();
			for key in moved {
				if let (Some(item), Some(new_key)) = (items.remove(&key), key.rebase(&old, &new)) {
					items.insert(new_key, item);
				}
			}

			if let Some(parent_item) = items.get_mut(&parent) {
				for child in &mut parent_item.children {
					if *child == old_name {
						new_name.clone_into(child);
					}
				}
			}
		}

		Some(self.full_pidl(&new))
	}

	/// Replaces the attributes of an item. Returns the new full pidl.
	pub fn update_item(&self, pidl: &PidlAbsolute, attributes: Attributes) -> Option<PidlAbsolute> {
		let pidl = pidl.without_metadata();
		self.items.write().get_mut(&pidl)?.attributes = attributes;

		Some(self.full_pidl(&pidl))
	}

	/// Removes an item and its whole subtree.
	pub fn remove_item(&self, pidl: &PidlAbsolute) -> bool {
		let pidl = pidl.without_metadata();
		let mut items = self.items.write();
		if pidl.is_root() || !items.contains_key(&pidl) {
			return false;
		}

		items.retain(|key, _| !pidl.is_ancestor(key));

		if let (Some(parent), Some(last)) = (pidl.parent(), pidl.last_item()) {
			if let Some(parent_item) = items.get_mut(&parent) {
				parent_item.children.retain(|child| child != last.name());
			}
		}

		true
	}

	#[must_use]
	pub fn contains(&self, pidl: &PidlAbsolute) -> bool {
		self.items.read().contains_key(pidl)
	}

	/// Makes every enumeration of `pidl` fail until cleared.
	pub fn set_enumeration_fails(&self, pidl: &PidlAbsolute, fails: bool) {
		let mut failing = self.failing_enumerations.write();
		if fails {
			failing.insert(pidl.without_metadata());
		} else {
			failing.remove(pidl);
		}
	}

	/// The pidl with metadata attached to its last item, or the pidl itself if the item is
	/// gone.
	#[must_use]
	pub fn full_pidl(&self, pidl: &PidlAbsolute) -> PidlAbsolute {
		let Some(last) = pidl.last_item() else {
			return PidlAbsolute::root();
		};

		self.items.read().get(pidl).map_or_else(
			|| pidl.clone(),
			|item| {
				pidl.with_last_item(PidlChild::with_metadata(
					last.name(),
					ItemMetadata::with_attributes(item.attributes),
				))
			},
		)
	}
}

impl ShellNamespace for MemoryNamespace {
	fn attributes(&self, pidl: &PidlAbsolute) -> Result<Attributes, NamespaceError> {
		self.items
			.read()
			.get(pidl)
			.map(|item| item.attributes)
			.ok_or_else(|| NamespaceError::NotFound(pidl.clone()))
	}

	fn display_name(
		&self,
		pidl: &PidlAbsolute,
		kind: DisplayNameKind,
	) -> Result<String, NamespaceError> {
		if !self.contains(pidl) {
			return Err(NamespaceError::NotFound(pidl.clone()));
		}

		Ok(match kind {
			DisplayNameKind::InFolder => pidl
				.last_item()
				.map_or_else(String::new, |item| item.name().to_owned()),
			DisplayNameKind::ForParsing => pidl.to_string(),
		})
	}

	fn parse_display_name(&self, name: &str) -> Result<PidlAbsolute, NamespaceError> {
		let Some(rest) = name.strip_prefix("::") else {
			return Err(NamespaceError::ParseDisplayName(name.to_owned()));
		};

		let pidl = if rest.is_empty() {
			PidlAbsolute::root()
		} else {
			rest.split("::").map(PidlChild::new).collect::<Vec<_>>().into()
		};

		if !self.contains(&pidl) {
			return Err(NamespaceError::ParseDisplayName(name.to_owned()));
		}

		Ok(self.full_pidl(&pidl))
	}

	fn link_target(&self, pidl: &PidlAbsolute) -> Result<Option<PidlAbsolute>, NamespaceError> {
		let items = self.items.read();
		let item = items
			.get(pidl)
			.ok_or_else(|| NamespaceError::NotFound(pidl.clone()))?;

		Ok(item.link_target.clone())
	}
}

impl ShellEnumerator for MemoryNamespace {
	fn enumerate_directory(
		&self,
		pidl: &PidlAbsolute,
		item_type: ItemType,
		hidden_item_policy: HiddenItemPolicy,
		stop: &CancellationToken,
	) -> Result<Vec<PidlChild>, NamespaceError> {
		if self.failing_enumerations.read().contains(pidl) {
			return Err(NamespaceError::NotFound(pidl.clone()));
		}

		let filter = ShellItemFilter::new(item_type, hidden_item_policy);
		let items = self.items.read();
		let item = items
			.get(pidl)
			.ok_or_else(|| NamespaceError::NotFound(pidl.clone()))?;

		if !item.attributes.contains(Attributes::FOLDER) {
			return Err(NamespaceError::NotAContainer(pidl.clone()));
		}

		let mut children = Vec::with_capacity(item.children.len());
		for name in &item.children {
			if stop.is_cancelled() {
				return Err(NamespaceError::Stopped);
			}

			let child_pidl = pidl.join(PidlChild::new(name.as_str()));
			let Some(child) = items.get(&child_pidl) else {
				continue;
			};

			if filter.should_include(child.attributes) {
				children.push(PidlChild::with_metadata(
					name.as_str(),
					ItemMetadata::with_attributes(child.attributes),
				));
			}
		}

		Ok(children)
	}
}

impl PidlUpdater for MemoryNamespace {
	fn get_updated_pidl(&self, simple: &PidlAbsolute) -> PidlAbsolute {
		self.full_pidl(simple)
	}
}
