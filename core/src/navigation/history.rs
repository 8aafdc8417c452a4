use std::{
	fmt,
	sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};
use sn_shell::PidlAbsolute;

static NEXT_HISTORY_ENTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Unique across the whole process, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HistoryEntryId(u64);

impl HistoryEntryId {
	fn next() -> Self {
		Self(NEXT_HISTORY_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for HistoryEntryId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
	id: HistoryEntryId,
	pidl: PidlAbsolute,
	display_name: String,
	full_path_for_display: String,
	system_icon_index: Option<i32>,
}

impl HistoryEntry {
	pub fn new(
		pidl: PidlAbsolute,
		display_name: impl Into<String>,
		full_path_for_display: impl Into<String>,
	) -> Self {
		Self {
			id: HistoryEntryId::next(),
			pidl,
			display_name: display_name.into(),
			full_path_for_display: full_path_for_display.into(),
			system_icon_index: None,
		}
	}

	#[must_use]
	pub const fn id(&self) -> HistoryEntryId {
		self.id
	}

	#[must_use]
	pub const fn pidl(&self) -> &PidlAbsolute {
		&self.pidl
	}

	#[must_use]
	pub fn display_name(&self) -> &str {
		&self.display_name
	}

	#[must_use]
	pub fn full_path_for_display(&self) -> &str {
		&self.full_path_for_display
	}

	#[must_use]
	pub const fn system_icon_index(&self) -> Option<i32> {
		self.system_icon_index
	}

	pub(crate) fn set_system_icon_index(&mut self, index: i32) {
		self.system_icon_index = Some(index);
	}
}

/// History entry detached from any controller, used to restore history into a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreservedHistoryEntry {
	pub pidl: PidlAbsolute,
	pub display_name: String,
	pub full_path_for_display: String,
	pub system_icon_index: Option<i32>,
}

impl From<&HistoryEntry> for PreservedHistoryEntry {
	fn from(entry: &HistoryEntry) -> Self {
		Self {
			pidl: entry.pidl.clone(),
			display_name: entry.display_name.clone(),
			full_path_for_display: entry.full_path_for_display.clone(),
			system_icon_index: entry.system_icon_index,
		}
	}
}

impl From<&PreservedHistoryEntry> for HistoryEntry {
	fn from(preserved: &PreservedHistoryEntry) -> Self {
		Self {
			id: HistoryEntryId::next(),
			pidl: preserved.pidl.clone(),
			display_name: preserved.display_name.clone(),
			full_path_for_display: preserved.full_path_for_display.clone(),
			system_icon_index: preserved.system_icon_index,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use sn_shell::PidlChild;

	#[test]
	fn restored_entries_get_fresh_ids() {
		let mut entry = HistoryEntry::new(
			PidlAbsolute::from_items(vec![PidlChild::new("a")]),
			"a",
			"::a",
		);
		entry.set_system_icon_index(3);

		let preserved = PreservedHistoryEntry::from(&entry);
		let restored = HistoryEntry::from(&preserved);

		assert_ne!(restored.id(), entry.id());
		assert_eq!(restored.pidl(), entry.pidl());
		assert_eq!(restored.display_name(), "a");
		assert_eq!(restored.system_icon_index(), Some(3));
	}
}
