use crate::{
	context::ShellContext,
	shell_entry::{collection::Shared, EntryId, EntrySignals, RemovedEntry},
};

use std::{
	collections::HashMap,
	mem,
	sync::{Arc, Weak},
};

use sn_fs_watcher::{Behavior, Callback, DirectoryWatcher, Event, Filters};
use sn_shell::{
	Attributes, CancellationToken, HiddenItemPolicy, ItemType, PidlAbsolute, ShellItemFilter,
};
use tracing::{debug, error, trace, warn};

pub(crate) struct Node {
	pub pidl: PidlAbsolute,
	pub parent: Option<EntryId>,
	pub children: HashMap<PidlAbsolute, EntryId>,
	pub children_loaded: bool,
	pub watcher: Option<Box<dyn DirectoryWatcher>>,
	pub signals: Arc<EntrySignals>,
}

#[derive(Default)]
pub(crate) struct EntryTree {
	pub nodes: HashMap<EntryId, Node>,
	/// In insertion order.
	pub top_level: Vec<EntryId>,
	next_id: u64,
}

impl EntryTree {
	pub fn insert(&mut self, pidl: PidlAbsolute, parent: Option<EntryId>) -> EntryId {
		let id = EntryId(self.next_id);
		self.next_id += 1;

		self.nodes.insert(
			id,
			Node {
				pidl,
				parent,
				children: HashMap::new(),
				children_loaded: false,
				watcher: None,
				signals: Arc::default(),
			},
		);

		id
	}

	/// Detaches a node and drops all of its descendants, returning the node itself.
	pub fn remove_subtree(&mut self, id: EntryId) -> Option<Node> {
		let node = self.nodes.remove(&id)?;

		let mut stack = node.children.values().copied().collect::<Vec<_>>();
		while let Some(next) = stack.pop() {
			if let Some(child) = self.nodes.remove(&next) {
				stack.extend(child.children.values().copied());
			}
		}

		Some(node)
	}
}

/// Something observers have to hear about once the tree is unlocked.
pub(crate) enum Delta {
	ChildAdded {
		parent: Option<Arc<EntrySignals>>,
		entry: EntryId,
	},
	ChildRemoved {
		parent: Option<Arc<EntrySignals>>,
		removed: RemovedEntry,
	},
	Renamed {
		signals: Arc<EntrySignals>,
		entry: EntryId,
	},
	Updated {
		signals: Arc<EntrySignals>,
		entry: EntryId,
	},
	TopLevelEntryDeleted {
		signals: Arc<EntrySignals>,
		entry: EntryId,
	},
}

/// A locked tree plus everything needed to change it. Changes are recorded as
/// [`Delta`]s and dispatched by the caller after unlocking.
pub(crate) struct Mutation<'a> {
	pub tree: &'a mut EntryTree,
	pub context: &'a ShellContext,
	pub filter: ShellItemFilter,
	pub shared: &'a Weak<Shared>,
	pub deltas: Vec<Delta>,
}

impl Mutation<'_> {
	fn pidl_of(&self, id: EntryId) -> Option<PidlAbsolute> {
		self.tree.nodes.get(&id).map(|node| node.pidl.clone())
	}

	fn child_of(&self, id: EntryId, pidl: &PidlAbsolute) -> Option<EntryId> {
		self.tree
			.nodes
			.get(&id)
			.and_then(|node| node.children.get(pidl).copied())
	}

	fn is_container(&self, pidl: &PidlAbsolute) -> bool {
		self.context.namespace().has_attributes(pidl, Attributes::FOLDER)
	}

	fn should_include(&self, pidl: &PidlAbsolute) -> bool {
		let namespace = self.context.namespace();

		if self.filter.item_type == ItemType::FoldersOnly
			&& !namespace.has_attributes(pidl, Attributes::FOLDER)
		{
			return false;
		}

		!(self.filter.hidden_item_policy == HiddenItemPolicy::Exclude
			&& namespace.has_attributes(pidl, Attributes::HIDDEN))
	}

	pub fn add_top_level(&mut self, pidl: PidlAbsolute) -> EntryId {
		let id = self.tree.insert(pidl, None);
		self.tree.top_level.push(id);
		self.deltas.push(Delta::ChildAdded {
			parent: None,
			entry: id,
		});

		id
	}

	pub fn load_children(&mut self, id: EntryId) {
		let Some(node) = self.tree.nodes.get(&id) else {
			return;
		};

		if node.children_loaded {
			return;
		}

		let pidl = node.pidl.clone();
		if !self.is_container(&pidl) {
			error!(%pidl, "Tried to load the children of an item that isn't a container;");
			debug_assert!(false, "{pidl} isn't a container");
			return;
		}

		let children = self
			.context
			.enumerator()
			.enumerate_directory(
				&pidl,
				self.filter.item_type,
				self.filter.hidden_item_policy,
				&CancellationToken::new(),
			)
			.unwrap_or_else(|e| {
				warn!(?e, %pidl, "Failed to enumerate children;");
				Vec::new()
			});

		for child in children {
			self.add_child(id, pidl.join(child));
		}

		if let Some(node) = self.tree.nodes.get_mut(&id) {
			node.children_loaded = true;
		}

		self.update_watcher(id);
	}

	pub fn unload_children(&mut self, id: EntryId) {
		let Some(node) = self.tree.nodes.get_mut(&id) else {
			return;
		};

		if !node.children_loaded {
			return;
		}

		let children = mem::take(&mut node.children);
		node.children_loaded = false;
		let signals = Arc::clone(&node.signals);

		for child in children.into_values() {
			if let Some(removed) = self.tree.remove_subtree(child) {
				self.deltas.push(Delta::ChildRemoved {
					parent: Some(Arc::clone(&signals)),
					removed: RemovedEntry {
						id: child,
						pidl: removed.pidl,
					},
				});
			}
		}

		self.update_watcher(id);
	}

	fn add_child(&mut self, parent: EntryId, pidl: PidlAbsolute) {
		if !self.should_include(&pidl) {
			trace!(%pidl, "Child filtered out;");
			return;
		}

		let Some(parent_node) = self.tree.nodes.get(&parent) else {
			return;
		};
		debug_assert!(parent_node.pidl.is_parent(&pidl));

		if parent_node.children.contains_key(&pidl) {
			return;
		}
		let signals = Arc::clone(&parent_node.signals);

		let id = self.tree.insert(pidl.clone(), Some(parent));
		if let Some(parent_node) = self.tree.nodes.get_mut(&parent) {
			parent_node.children.insert(pidl, id);
		}

		self.deltas.push(Delta::ChildAdded {
			parent: Some(signals),
			entry: id,
		});
	}

	/// Watches the entry while its children are loaded, and only then.
	fn update_watcher(&mut self, id: EntryId) {
		let Some(node) = self.tree.nodes.get(&id) else {
			return;
		};

		let watcher = if node.children_loaded {
			let shared = Weak::clone(self.shared);
			let callback: Callback = Arc::new(move |event, pidl1, pidl2| {
				if let Some(shared) = shared.upgrade() {
					shared.process_change(id, event, pidl1, pidl2);
				}
			});

			self.context.watcher_factory().maybe_create(
				&node.pidl,
				Filters::ALL,
				callback,
				Behavior::NonRecursive,
			)
		} else {
			None
		};

		if let Some(node) = self.tree.nodes.get_mut(&id) {
			node.watcher = watcher;
		}
	}

	pub fn process_change(
		&mut self,
		id: EntryId,
		event: Event,
		pidl1: &PidlAbsolute,
		pidl2: Option<&PidlAbsolute>,
	) {
		let Some(pidl) = self.pidl_of(id) else {
			trace!(entry_id = %id, "Change for a removed entry;");
			return;
		};

		match event {
			Event::Added => {
				if pidl.is_parent(pidl1) {
					self.on_child_added(id, pidl1);
				}
			}
			Event::Renamed => {
				let Some(pidl2) = pidl2 else {
					warn!(%pidl1, "Rename without a new name;");
					return;
				};

				if pidl.is_parent(pidl1) {
					self.on_child_renamed(id, pidl1, pidl2);
				} else if pidl == *pidl1 {
					self.on_current_entry_renamed(id, pidl2);
				} else if pidl.is_parent(pidl2) {
					// Moved in from somewhere else
					self.on_child_added(id, pidl2);
				}
			}
			Event::Modified => {
				if pidl.is_parent(pidl1) {
					self.on_child_updated(id, pidl1);
				} else if pidl == *pidl1 {
					self.on_current_entry_updated(id);
				}
			}
			Event::Removed => {
				if pidl.is_parent(pidl1) {
					self.on_child_removed(id, pidl1);
				} else if pidl == *pidl1 {
					self.on_current_entry_removed(id);
				}
			}
			Event::DirectoryContentsChanged => {
				trace!(%pidl, "Ignoring directory contents change;");
			}
		}
	}

	fn on_child_added(&mut self, id: EntryId, simple: &PidlAbsolute) {
		if self.child_of(id, simple).is_some() {
			trace!(%simple, "Child already present;");
			return;
		}

		let full = self.context.pidl_updater().get_updated_pidl(simple);
		self.add_child(id, full);
	}

	fn on_child_renamed(&mut self, id: EntryId, old: &PidlAbsolute, new: &PidlAbsolute) {
		let Some(pidl) = self.pidl_of(id) else {
			return;
		};

		match self.child_of(id, old) {
			Some(_) if !pidl.is_parent(new) => {
				debug!(%old, %new, "Child moved elsewhere;");
				self.on_child_removed(id, old);
			}
			Some(child) => self.on_current_entry_renamed(child, new),
			None if pidl.is_parent(new) => self.on_child_added(id, new),
			None => {}
		}
	}

	fn on_child_updated(&mut self, id: EntryId, simple: &PidlAbsolute) {
		match self.child_of(id, simple) {
			Some(child) => self.on_current_entry_updated(child),
			None => self.on_child_added(id, simple),
		}
	}

	fn on_child_removed(&mut self, id: EntryId, simple: &PidlAbsolute) {
		let Some(node) = self.tree.nodes.get_mut(&id) else {
			return;
		};

		let Some(child) = node.children.remove(simple) else {
			trace!(%simple, "Removed item isn't a known child;");
			return;
		};
		let signals = Arc::clone(&node.signals);

		if let Some(removed) = self.tree.remove_subtree(child) {
			self.deltas.push(Delta::ChildRemoved {
				parent: Some(signals),
				removed: RemovedEntry {
					id: child,
					pidl: removed.pidl,
				},
			});
		}
	}

	fn on_current_entry_renamed(&mut self, id: EntryId, simple: &PidlAbsolute) {
		let full = self.context.pidl_updater().get_updated_pidl(simple);

		if !self.should_include(&full) {
			self.on_current_entry_removed(id);
			return;
		}

		if !self.is_container(&full) {
			self.unload_children(id);
		}

		self.replace_pidl(id, full);
		self.rebuild_pidl_recursive(id);

		if let Some(node) = self.tree.nodes.get(&id) {
			self.deltas.push(Delta::Renamed {
				signals: Arc::clone(&node.signals),
				entry: id,
			});
		}
	}

	fn on_current_entry_updated(&mut self, id: EntryId) {
		let Some(pidl) = self.pidl_of(id) else {
			return;
		};

		let full = self.context.pidl_updater().get_updated_pidl(&pidl);
		self.replace_pidl(id, full.clone());

		if !self.should_include(&full) {
			self.on_current_entry_removed(id);
			return;
		}

		if let Some(node) = self.tree.nodes.get(&id) {
			self.deltas.push(Delta::Updated {
				signals: Arc::clone(&node.signals),
				entry: id,
			});
		}
	}

	fn on_current_entry_removed(&mut self, id: EntryId) {
		let Some(node) = self.tree.nodes.get(&id) else {
			return;
		};

		match node.parent {
			Some(parent) => {
				let pidl = node.pidl.clone();
				self.on_child_removed(parent, &pidl);
			}
			None => self.deltas.push(Delta::TopLevelEntryDeleted {
				signals: Arc::clone(&node.signals),
				entry: id,
			}),
		}
	}

	/// Replaces the pidl of an entry and re-keys it in its parent. A sibling already known
	/// under the new name is removed, as the item it stood for was overwritten.
	fn replace_pidl(&mut self, id: EntryId, new: PidlAbsolute) {
		let Some(node) = self.tree.nodes.get_mut(&id) else {
			return;
		};

		let old = mem::replace(&mut node.pidl, new.clone());
		let Some(parent) = node.parent else {
			return;
		};

		let Some(parent_node) = self.tree.nodes.get_mut(&parent) else {
			return;
		};

		let previous = parent_node.children.remove(&old);
		debug_assert_eq!(previous, Some(id));

		let Some(displaced) = parent_node
			.children
			.insert(new.clone(), id)
			.filter(|&other| other != id)
		else {
			return;
		};
		let signals = Arc::clone(&parent_node.signals);

		debug!(%old, %new, "Renamed over an existing child;");
		if let Some(removed) = self.tree.remove_subtree(displaced) {
			self.deltas.push(Delta::ChildRemoved {
				parent: Some(signals),
				removed: RemovedEntry {
					id: displaced,
					pidl: removed.pidl,
				},
			});
		}
	}

	/// Recomputes the pidls below an entry from its own, re-creating the watchers of every
	/// loaded entry along the way.
	fn rebuild_pidl_recursive(&mut self, id: EntryId) {
		let Some(node) = self.tree.nodes.get(&id) else {
			return;
		};

		if let Some(parent) = node.parent {
			let rebuilt = self
				.tree
				.nodes
				.get(&parent)
				.zip(node.pidl.last_item())
				.map(|(parent_node, last)| parent_node.pidl.join(last.clone()));

			if let (Some(rebuilt), Some(node)) = (rebuilt, self.tree.nodes.get_mut(&id)) {
				node.pidl = rebuilt;
			}
		}

		let Some(node) = self.tree.nodes.get(&id) else {
			return;
		};

		if !node.children_loaded {
			return;
		}

		let children = node.children.values().copied().collect::<Vec<_>>();
		for child in &children {
			self.rebuild_pidl_recursive(*child);
		}

		let rekeyed = children
			.into_iter()
			.filter_map(|child| {
				self.tree
					.nodes
					.get(&child)
					.map(|child_node| (child_node.pidl.clone(), child))
			})
			.collect();
		if let Some(node) = self.tree.nodes.get_mut(&id) {
			node.children = rekeyed;
		}

		self.update_watcher(id);
	}
}
