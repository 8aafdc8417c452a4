use crate::{
	context::ShellContext,
	navigation::{
		HistoryEntry, HistoryEntryId, HistoryEntryType, NavigateParams, NavigationId,
		NavigationManager, NavigationRequest, PreservedHistoryEntry,
	},
	signal::{ConnectPosition, ScopedConnection, SlotGroup},
};

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use sn_shell::{DisplayNameKind, NamespaceError, PidlAbsolute, ShellNamespace};
use tracing::{debug, instrument, trace, warn};

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
	#[error("there is no current history entry")]
	NoCurrentEntry,
	#[error("there is no history entry at offset {0}")]
	InvalidHistoryOffset(i32),
	#[error(transparent)]
	Namespace(#[from] NamespaceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NavigationMode {
	#[default]
	Normal,
	/// Once something is shown, every navigation opens a new tab.
	ForceNewTab,
}

/// Opens navigations in new tabs.
pub trait TabNavigation: Send + Sync {
	fn create_new_tab(&self, params: NavigateParams, selected: bool);
}

pub type IconCallback = Box<dyn FnOnce(i32) + Send>;

/// Looks up the system icon of an item in the background.
pub trait IconFetcher: Send + Sync {
	fn queue_icon_task(&self, pidl: &PidlAbsolute, callback: IconCallback);
}

#[derive(Debug, Default)]
struct History {
	entries: Vec<HistoryEntry>,
	current_index: Option<usize>,
}

impl History {
	fn add_entry(&mut self, entry: HistoryEntry) {
		let insert_at = self.current_index.map_or(0, |index| index + 1);
		self.entries.truncate(insert_at);
		self.entries.push(entry);
		self.current_index = Some(insert_at);
	}

	fn replace_current_entry(&mut self, entry: HistoryEntry) {
		match self.current_index {
			Some(index) => self.entries[index] = entry,
			None => self.add_entry(entry),
		}
	}

	fn current(&self) -> Option<&HistoryEntry> {
		self.current_index.and_then(|index| self.entries.get(index))
	}

	fn index_of(&self, id: HistoryEntryId) -> Option<usize> {
		self.entries.iter().position(|entry| entry.id() == id)
	}

	fn entry(&self, offset: i32) -> Option<&HistoryEntry> {
		let current = self.current_index?;
		let index = current.checked_add_signed(isize::try_from(offset).ok()?)?;
		self.entries.get(index)
	}
}

struct Shared {
	namespace: Arc<dyn ShellNamespace>,
	icon_fetcher: Arc<dyn IconFetcher>,
	history: Mutex<History>,
}

impl Shared {
	fn on_navigation_committed(self: &Arc<Self>, request: &NavigationRequest) {
		let params = request.params();

		let entry = params
			.records_history()
			.then(|| self.create_entry(&params.pidl));
		let created = entry.as_ref().map(|entry| (entry.id(), entry.pidl().clone()));

		{
			let mut history = self.history.lock();

			if let Some(id) = params.history_entry_id {
				match history.index_of(id) {
					Some(index) => history.current_index = Some(index),
					None => debug!(history_entry_id = %id, "Committed history entry no longer exists;"),
				}
			}

			match (params.history_entry_type, entry) {
				(HistoryEntryType::AddEntry, Some(entry)) => history.add_entry(entry),
				(HistoryEntryType::ReplaceCurrentEntry, Some(entry)) => {
					history.replace_current_entry(entry);
				}
				_ => {}
			}
		}

		if let Some((id, pidl)) = created {
			let shared = Arc::downgrade(self);
			self.icon_fetcher
				.queue_icon_task(&pidl, Box::new(move |icon| Self::on_icon_fetched(&shared, id, icon)));
		}
	}

	fn on_icon_fetched(shared: &Weak<Self>, id: HistoryEntryId, icon: i32) {
		let Some(shared) = shared.upgrade() else {
			return;
		};

		let mut history = shared.history.lock();
		match history.entries.iter_mut().find(|entry| entry.id() == id) {
			Some(entry) => entry.set_system_icon_index(icon),
			None => trace!(history_entry_id = %id, "Icon fetched for a replaced entry;"),
		}
	}

	fn create_entry(&self, pidl: &PidlAbsolute) -> HistoryEntry {
		let display_name = self
			.namespace
			.display_name(pidl, DisplayNameKind::InFolder)
			.unwrap_or_else(|e| {
				warn!(?e, %pidl, "Failed to get display name for history entry;");
				String::new()
			});
		let full_path = self
			.namespace
			.display_name(pidl, DisplayNameKind::ForParsing)
			.unwrap_or_else(|_| pidl.to_string());

		HistoryEntry::new(pidl.clone(), display_name, full_path)
	}
}

/// Back and forward history on top of a [`NavigationManager`].
///
/// History only changes once a navigation commits, so a navigation that fails or gets
/// cancelled leaves it alone.
pub struct ShellNavigationController {
	manager: NavigationManager,
	shared: Arc<Shared>,
	tab_navigation: Arc<dyn TabNavigation>,
	navigation_mode: Mutex<NavigationMode>,
	_committed: ScopedConnection,
}

impl ShellNavigationController {
	pub fn new(
		manager: NavigationManager,
		context: &ShellContext,
		tab_navigation: Arc<dyn TabNavigation>,
		icon_fetcher: Arc<dyn IconFetcher>,
	) -> Self {
		Self::with_history(manager, context, tab_navigation, icon_fetcher, History::default())
	}

	/// Restores history, `current_index` is clamped to the restored entries.
	pub fn with_preserved_entries(
		manager: NavigationManager,
		context: &ShellContext,
		tab_navigation: Arc<dyn TabNavigation>,
		icon_fetcher: Arc<dyn IconFetcher>,
		preserved: &[PreservedHistoryEntry],
		current_index: usize,
	) -> Self {
		let entries = preserved.iter().map(HistoryEntry::from).collect::<Vec<_>>();
		let current_index = (!entries.is_empty()).then(|| current_index.min(entries.len() - 1));

		Self::with_history(
			manager,
			context,
			tab_navigation,
			icon_fetcher,
			History {
				entries,
				current_index,
			},
		)
	}

	fn with_history(
		manager: NavigationManager,
		context: &ShellContext,
		tab_navigation: Arc<dyn TabNavigation>,
		icon_fetcher: Arc<dyn IconFetcher>,
		history: History,
	) -> Self {
		let shared = Arc::new(Shared {
			namespace: Arc::clone(context.namespace()),
			icon_fetcher,
			history: Mutex::new(history),
		});

		// History has to be up to date before anyone else hears about the commit
		let committed: ScopedConnection = manager
			.add_navigation_committed_observer(
				{
					let shared = Arc::downgrade(&shared);
					move |request| {
						if let Some(shared) = shared.upgrade() {
							shared.on_navigation_committed(request);
						}
					}
				},
				ConnectPosition::AtFront,
				SlotGroup::HighestPriority,
			)
			.into();

		Self {
			manager,
			shared,
			tab_navigation,
			navigation_mode: Mutex::new(NavigationMode::Normal),
			_committed: committed,
		}
	}

	/// Starts a navigation. Returns `None` when it was handed over to a new tab.
	#[instrument(skip_all, fields(pidl = %params.pidl))]
	pub fn navigate(&self, mut params: NavigateParams) -> Option<NavigationId> {
		let current_pidl = self.shared.history.lock().current().map(|entry| entry.pidl().clone());

		if *self.navigation_mode.lock() == NavigationMode::ForceNewTab
			&& current_pidl.is_some()
			&& !params.override_navigation_mode
		{
			debug!("Opening navigation in a new tab;");
			self.tab_navigation.create_new_tab(params, true);
			return None;
		}

		if params.history_entry_type == HistoryEntryType::AddEntry
			&& current_pidl.as_ref() == Some(&params.pidl)
		{
			trace!("Navigating to the current location, replacing its entry;");
			params.history_entry_type = HistoryEntryType::ReplaceCurrentEntry;
		}

		Some(self.manager.start_navigation(params))
	}

	pub fn navigate_to_pidl(&self, pidl: PidlAbsolute) -> Option<NavigationId> {
		self.navigate(NavigateParams::normal(pidl))
	}

	pub fn navigate_to_path(&self, path: &str) -> Result<Option<NavigationId>, NavigationError> {
		let pidl = self.shared.namespace.parse_display_name(path)?;
		Ok(self.navigate_to_pidl(pidl))
	}

	pub fn navigate_to_entry(&self, entry: &HistoryEntry) -> Option<NavigationId> {
		self.navigate(NavigateParams::history(entry))
	}

	pub fn go_back(&self) -> Result<Option<NavigationId>, NavigationError> {
		self.go_to_offset(-1)
	}

	pub fn go_forward(&self) -> Result<Option<NavigationId>, NavigationError> {
		self.go_to_offset(1)
	}

	pub fn go_to_offset(&self, offset: i32) -> Result<Option<NavigationId>, NavigationError> {
		let entry = self
			.entry(offset)
			.ok_or(NavigationError::InvalidHistoryOffset(offset))?;

		Ok(self.navigate_to_entry(&entry))
	}

	pub fn go_up(&self) -> Result<Option<NavigationId>, NavigationError> {
		let current = self.current_entry().ok_or(NavigationError::NoCurrentEntry)?;
		let parent = self.shared.namespace.virtual_parent(current.pidl())?;

		Ok(self.navigate(NavigateParams::up(parent, current.pidl().clone())))
	}

	/// Navigates to the current entry again, leaving history as it is. Always happens in
	/// place, whatever the navigation mode.
	pub fn refresh(&self) -> Result<NavigationId, NavigationError> {
		let current = self.current_entry().ok_or(NavigationError::NoCurrentEntry)?;
		let params = NavigateParams::history(&current).with_override_navigation_mode(true);

		Ok(self.manager.start_navigation(params))
	}

	#[must_use]
	pub fn can_go_back(&self) -> bool {
		self.entry(-1).is_some()
	}

	#[must_use]
	pub fn can_go_forward(&self) -> bool {
		self.entry(1).is_some()
	}

	#[must_use]
	pub fn can_go_up(&self) -> bool {
		self.current_entry()
			.is_some_and(|entry| !self.shared.namespace.is_namespace_root(entry.pidl()))
	}

	#[must_use]
	pub fn current_entry(&self) -> Option<HistoryEntry> {
		self.shared.history.lock().current().cloned()
	}

	/// Entry relative to the current one, negative offsets go back.
	#[must_use]
	pub fn entry(&self, offset: i32) -> Option<HistoryEntry> {
		self.shared.history.lock().entry(offset).cloned()
	}

	#[must_use]
	pub fn entry_at_index(&self, index: usize) -> Option<HistoryEntry> {
		self.shared.history.lock().entries.get(index).cloned()
	}

	#[must_use]
	pub fn entry_by_id(&self, id: HistoryEntryId) -> Option<HistoryEntry> {
		let history = self.shared.history.lock();
		history.index_of(id).map(|index| history.entries[index].clone())
	}

	/// Entries before the current one, nearest first.
	#[must_use]
	pub fn back_history(&self) -> Vec<HistoryEntry> {
		let history = self.shared.history.lock();
		let end = history.current_index.unwrap_or(0);
		history.entries[..end].iter().rev().cloned().collect()
	}

	/// Entries after the current one, nearest first.
	#[must_use]
	pub fn forward_history(&self) -> Vec<HistoryEntry> {
		let history = self.shared.history.lock();
		history.current_index.map_or_else(Vec::new, |index| {
			history.entries[index + 1..].to_vec()
		})
	}

	#[must_use]
	pub fn num_history_entries(&self) -> usize {
		self.shared.history.lock().entries.len()
	}

	#[must_use]
	pub fn current_index(&self) -> Option<usize> {
		self.shared.history.lock().current_index
	}

	#[must_use]
	pub fn preserved_entries(&self) -> Vec<PreservedHistoryEntry> {
		self.shared
			.history
			.lock()
			.entries
			.iter()
			.map(PreservedHistoryEntry::from)
			.collect()
	}

	#[must_use]
	pub fn navigation_mode(&self) -> NavigationMode {
		*self.navigation_mode.lock()
	}

	pub fn set_navigation_mode(&self, mode: NavigationMode) {
		*self.navigation_mode.lock() = mode;
	}

	#[must_use]
	pub const fn navigation_manager(&self) -> &NavigationManager {
		&self.manager
	}
}
