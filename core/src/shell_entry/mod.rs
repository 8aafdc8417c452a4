//! A lazily expanded tree mirroring part of the shell namespace.
//!
//! Entries live in an arena owned by their [`ShellEntryCollection`] and are handed out as
//! [`ShellEntry`] handles. An entry whose children are loaded watches its directory and
//! keeps its children in sync with the changes it is notified of.

use crate::signal::Signal;

use std::fmt;

use sn_shell::PidlAbsolute;

mod collection;
mod entry;
mod tree;

pub use collection::ShellEntryCollection;
pub use entry::ShellEntry;

/// Never reused within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// An entry that was just removed, handles to it are already dead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEntry {
	pub id: EntryId,
	pub pidl: PidlAbsolute,
}

#[derive(Debug, Default)]
pub struct EntrySignals {
	pub child_added: Signal<ShellEntry>,
	pub child_removed: Signal<RemovedEntry>,
	pub renamed: Signal<ShellEntry>,
	pub updated: Signal<ShellEntry>,
	/// Only fired for top level entries, the collection evicts the entry right after.
	pub top_level_entry_deleted: Signal<ShellEntry>,
}

/// Aggregates the signals of every entry in a collection.
#[derive(Debug, Default)]
pub struct CollectionSignals {
	pub entry_added: Signal<ShellEntry>,
	pub entry_renamed: Signal<ShellEntry>,
	pub entry_updated: Signal<ShellEntry>,
	pub entry_removed: Signal<RemovedEntry>,
}
