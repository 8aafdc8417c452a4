use crate::shell_entry::{collection::Shared, tree::Node, EntryId, EntrySignals};

use std::{
	fmt,
	sync::{Arc, Weak},
};

use sn_fs_watcher::Event;
use sn_shell::{HiddenItemPolicy, ItemType, PidlAbsolute};

/// Handle to an entry of a [`crate::ShellEntryCollection`].
///
/// Handles are cheap to clone and never keep an entry alive. Once the entry is removed,
/// or its collection dropped, [`ShellEntry::is_alive`] returns `false`, queries return
/// nothing and operations do nothing.
#[derive(Clone)]
pub struct ShellEntry {
	id: EntryId,
	shared: Weak<Shared>,
}

impl ShellEntry {
	pub(crate) const fn new(id: EntryId, shared: Weak<Shared>) -> Self {
		Self { id, shared }
	}

	pub(crate) fn belongs_to(&self, shared: &Arc<Shared>) -> bool {
		Weak::ptr_eq(&self.shared, &Arc::downgrade(shared))
	}

	fn with_node<R>(&self, f: impl FnOnce(&Shared, &Node) -> R) -> Option<R> {
		let shared = self.shared.upgrade()?;
		let tree = shared.tree.lock();
		tree.nodes.get(&self.id).map(|node| f(&*shared, node))
	}

	#[must_use]
	pub const fn id(&self) -> EntryId {
		self.id
	}

	#[must_use]
	pub fn is_alive(&self) -> bool {
		self.with_node(|_, _| ()).is_some()
	}

	#[must_use]
	pub fn pidl(&self) -> Option<PidlAbsolute> {
		self.with_node(|_, node| node.pidl.clone())
	}

	#[must_use]
	pub fn parent(&self) -> Option<Self> {
		self.with_node(|shared, node| node.parent.map(|parent| shared.handle(parent)))
			.flatten()
	}

	/// Children sorted by name.
	#[must_use]
	pub fn children(&self) -> Vec<Self> {
		self.with_node(|shared, node| {
			let mut children = node
				.children
				.iter()
				.map(|(pidl, id)| (pidl.last_item().map(|item| item.name().to_owned()), *id))
				.collect::<Vec<_>>();
			children.sort();

			children
				.into_iter()
				.map(|(_, id)| shared.handle(id))
				.collect()
		})
		.unwrap_or_default()
	}

	#[must_use]
	pub fn maybe_get_child(&self, pidl: &PidlAbsolute) -> Option<Self> {
		self.with_node(|shared, node| node.children.get(pidl).map(|id| shared.handle(*id)))
			.flatten()
	}

	#[must_use]
	pub fn are_children_loaded(&self) -> bool {
		self.with_node(|_, node| node.children_loaded)
			.unwrap_or(false)
	}

	#[must_use]
	pub fn is_watched(&self) -> bool {
		self.with_node(|_, node| node.watcher.is_some())
			.unwrap_or(false)
	}

	#[must_use]
	pub fn signals(&self) -> Option<Arc<EntrySignals>> {
		self.with_node(|_, node| Arc::clone(&node.signals))
	}

	#[must_use]
	pub fn child_item_type(&self) -> Option<ItemType> {
		self.shared.upgrade().map(|shared| shared.filter.item_type)
	}

	#[must_use]
	pub fn hidden_item_policy(&self) -> Option<HiddenItemPolicy> {
		self.shared
			.upgrade()
			.map(|shared| shared.filter.hidden_item_policy)
	}

	/// Enumerates the children synchronously and starts watching the entry.
	pub fn load_children(&self) {
		if let Some(shared) = self.shared.upgrade() {
			shared.mutate(|mutation| mutation.load_children(self.id));
		}
	}

	/// Removes every child and stops watching the entry.
	pub fn unload_children(&self) {
		if let Some(shared) = self.shared.upgrade() {
			shared.mutate(|mutation| mutation.unload_children(self.id));
		}
	}

	/// Applies a change notification, as delivered by the entry's own watcher.
	pub fn process_directory_change_notification(
		&self,
		event: Event,
		pidl1: &PidlAbsolute,
		pidl2: Option<&PidlAbsolute>,
	) {
		if let Some(shared) = self.shared.upgrade() {
			shared.process_change(self.id, event, pidl1, pidl2);
		}
	}
}

impl PartialEq for ShellEntry {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id && Weak::ptr_eq(&self.shared, &other.shared)
	}
}

impl Eq for ShellEntry {}

impl fmt::Debug for ShellEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ShellEntry")
			.field("id", &self.id)
			.field("collection_alive", &(self.shared.strong_count() > 0))
			.finish()
	}
}
