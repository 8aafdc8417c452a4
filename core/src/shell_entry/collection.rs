use crate::{
	context::ShellContext,
	shell_entry::{
		tree::{Delta, EntryTree, Mutation},
		CollectionSignals, EntryId, RemovedEntry, ShellEntry,
	},
};

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use sn_fs_watcher::Event;
use sn_shell::{Attributes, PidlAbsolute, ShellItemFilter};
use tracing::{debug, trace};

pub(crate) struct Shared {
	pub context: ShellContext,
	pub filter: ShellItemFilter,
	pub tree: Mutex<EntryTree>,
	pub signals: CollectionSignals,
	weak_self: Weak<Self>,
}

impl Shared {
	/// Runs `f` against the locked tree, then tells observers what changed.
	pub fn mutate<R>(&self, f: impl FnOnce(&mut Mutation<'_>) -> R) -> R {
		let (result, deltas) = {
			let mut tree = self.tree.lock();
			let mut mutation = Mutation {
				tree: &mut tree,
				context: &self.context,
				filter: self.filter,
				shared: &self.weak_self,
				deltas: Vec::new(),
			};

			let result = f(&mut mutation);
			(result, mutation.deltas)
		};

		self.dispatch(deltas);
		result
	}

	pub fn process_change(
		&self,
		id: EntryId,
		event: Event,
		pidl1: &PidlAbsolute,
		pidl2: Option<&PidlAbsolute>,
	) {
		trace!(entry_id = %id, ?event, %pidl1, "Processing directory change;");
		self.mutate(|mutation| mutation.process_change(id, event, pidl1, pidl2));
	}

	pub fn handle(&self, id: EntryId) -> ShellEntry {
		ShellEntry::new(id, Weak::clone(&self.weak_self))
	}

	/// Removes a top level entry with everything below it.
	fn evict_top_level(&self, id: EntryId) -> Option<RemovedEntry> {
		let node = {
			let mut tree = self.tree.lock();
			let index = tree.top_level.iter().position(|entry| *entry == id)?;
			tree.top_level.remove(index);
			tree.remove_subtree(id)?
		};

		Some(RemovedEntry {
			id,
			pidl: node.pidl.clone(),
		})
	}

	// Entry signals go first, so that an entry's own observers always hear about a change
	// before the collection wide ones.
	fn dispatch(&self, deltas: Vec<Delta>) {
		for delta in deltas {
			match delta {
				Delta::ChildAdded { parent, entry } => {
					let entry = self.handle(entry);
					if let Some(parent) = parent {
						parent.child_added.emit(&entry);
					}
					self.signals.entry_added.emit(&entry);
				}
				Delta::ChildRemoved { parent, removed } => {
					if let Some(parent) = parent {
						parent.child_removed.emit(&removed);
					}
					self.signals.entry_removed.emit(&removed);
				}
				Delta::Renamed { signals, entry } => {
					let entry = self.handle(entry);
					signals.renamed.emit(&entry);
					self.signals.entry_renamed.emit(&entry);
				}
				Delta::Updated { signals, entry } => {
					let entry = self.handle(entry);
					signals.updated.emit(&entry);
					self.signals.entry_updated.emit(&entry);
				}
				Delta::TopLevelEntryDeleted { signals, entry } => {
					signals.top_level_entry_deleted.emit(&self.handle(entry));

					if let Some(removed) = self.evict_top_level(entry) {
						debug!(entry_id = %removed.id, pidl = %removed.pidl, "Top level entry deleted;");
						self.signals.entry_removed.emit(&removed);
					}
				}
			}
		}
	}
}

/// Owns a forest of unrelated top level entries.
///
/// Dropping the collection drops every entry and stops all of their watchers.
pub struct ShellEntryCollection {
	shared: Arc<Shared>,
}

impl ShellEntryCollection {
	pub fn new(context: ShellContext, filter: ShellItemFilter) -> Self {
		Self {
			shared: Arc::new_cyclic(|weak_self| Shared {
				context,
				filter,
				tree: Mutex::default(),
				signals: CollectionSignals::default(),
				weak_self: Weak::clone(weak_self),
			}),
		}
	}

	/// Adds an entry for `pidl`. Its children aren't loaded.
	pub fn add_top_level_entry(&self, pidl: &PidlAbsolute) -> ShellEntry {
		let id = self.shared.mutate(|mutation| mutation.add_top_level(pidl.clone()));
		self.shared.handle(id)
	}

	pub fn remove_top_level_entry(&self, entry: &ShellEntry) -> bool {
		if !entry.belongs_to(&self.shared) {
			return false;
		}

		match self.shared.evict_top_level(entry.id()) {
			Some(removed) => {
				self.shared.signals.entry_removed.emit(&removed);
				true
			}
			None => false,
		}
	}

	#[must_use]
	pub fn top_level_entries(&self) -> Vec<ShellEntry> {
		let ids = self.shared.tree.lock().top_level.clone();
		ids.into_iter().map(|id| self.shared.handle(id)).collect()
	}

	#[must_use]
	pub fn top_level_entry_index(&self, entry: &ShellEntry) -> Option<usize> {
		if !entry.belongs_to(&self.shared) {
			return None;
		}

		self.shared
			.tree
			.lock()
			.top_level
			.iter()
			.position(|id| *id == entry.id())
	}

	#[must_use]
	pub fn entry(&self, id: EntryId) -> Option<ShellEntry> {
		self.shared
			.tree
			.lock()
			.nodes
			.contains_key(&id)
			.then(|| self.shared.handle(id))
	}

	#[must_use]
	pub fn num_entries(&self) -> usize {
		self.shared.tree.lock().nodes.len()
	}

	/// Finds the entry for `pidl` below one of the top level entries, loading the children
	/// of every entry on the way.
	pub fn maybe_load_entry_for_pidl(&self, pidl: &PidlAbsolute) -> Option<ShellEntry> {
		self.top_level_entries()
			.into_iter()
			.find_map(|top_level| self.load_towards(top_level.id(), pidl))
	}

	fn load_towards(&self, mut current: EntryId, target: &PidlAbsolute) -> Option<ShellEntry> {
		loop {
			let pidl = self.shared.tree.lock().nodes.get(&current)?.pidl.clone();
			if !pidl.is_ancestor(target) {
				return None;
			}

			if pidl == *target {
				return Some(self.shared.handle(current));
			}

			if !self
				.shared
				.context
				.namespace()
				.has_attributes(&pidl, Attributes::FOLDER)
			{
				return None;
			}

			self.shared.mutate(|mutation| mutation.load_children(current));

			current = self
				.shared
				.tree
				.lock()
				.nodes
				.get(&current)?
				.children
				.iter()
				.find_map(|(child, id)| child.is_ancestor(target).then_some(*id))?;
		}
	}

	#[must_use]
	pub fn signals(&self) -> &CollectionSignals {
		&self.shared.signals
	}

	#[must_use]
	pub fn filter(&self) -> ShellItemFilter {
		self.shared.filter
	}
}
