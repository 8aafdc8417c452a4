use crate::navigation::{HistoryEntry, HistoryEntryId};

use sn_shell::PidlAbsolute;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HistoryEntryType {
	/// The navigation leaves history alone.
	None,
	#[default]
	AddEntry,
	ReplaceCurrentEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NavigationType {
	#[default]
	Normal,
	History,
	Up,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigateParams {
	/// Location the navigation was started for.
	pub request_pidl: PidlAbsolute,
	/// Location actually enumerated, the link target when `request_pidl` is a link.
	pub pidl: PidlAbsolute,
	/// Set for history navigations, the entry becomes current once committed.
	pub history_entry_id: Option<HistoryEntryId>,
	pub history_entry_type: HistoryEntryType,
	pub navigation_type: NavigationType,
	/// Navigates in place even if the controller forces new tabs.
	pub override_navigation_mode: bool,
	/// Location navigated away from, for [`NavigationType::Up`].
	pub original_pidl: Option<PidlAbsolute>,
}

impl NavigateParams {
	pub fn normal(pidl: PidlAbsolute) -> Self {
		Self::normal_with_history_type(pidl, HistoryEntryType::AddEntry)
	}

	pub fn normal_with_history_type(pidl: PidlAbsolute, history_entry_type: HistoryEntryType) -> Self {
		Self {
			request_pidl: pidl.clone(),
			pidl,
			history_entry_id: None,
			history_entry_type,
			navigation_type: NavigationType::Normal,
			override_navigation_mode: false,
			original_pidl: None,
		}
	}

	pub fn history(entry: &HistoryEntry) -> Self {
		Self {
			request_pidl: entry.pidl().clone(),
			pidl: entry.pidl().clone(),
			history_entry_id: Some(entry.id()),
			history_entry_type: HistoryEntryType::None,
			navigation_type: NavigationType::History,
			override_navigation_mode: false,
			original_pidl: None,
		}
	}

	pub fn up(parent: PidlAbsolute, current: PidlAbsolute) -> Self {
		Self {
			navigation_type: NavigationType::Up,
			original_pidl: Some(current),
			..Self::normal(parent)
		}
	}

	#[must_use]
	pub const fn with_override_navigation_mode(mut self, override_navigation_mode: bool) -> Self {
		self.override_navigation_mode = override_navigation_mode;
		self
	}

	/// Whether committing this navigation adds or replaces a history entry.
	#[must_use]
	pub const fn records_history(&self) -> bool {
		!matches!(self.history_entry_type, HistoryEntryType::None)
	}
}
