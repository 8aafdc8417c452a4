//! Recording stand-ins for the collaborators the engine calls out to.

use std::sync::Arc;

use parking_lot::Mutex;
use sn_core::{
	navigation::{IconCallback, IconFetcher, TabNavigation},
	Connection, NavigateParams, NavigationId, NavigationManager, NavigationRequest,
	ScopedConnection,
};
use sn_shell::PidlAbsolute;

#[derive(Default)]
pub struct RecordingTabNavigation {
	pub tabs: Mutex<Vec<(NavigateParams, bool)>>,
}

impl TabNavigation for RecordingTabNavigation {
	fn create_new_tab(&self, params: NavigateParams, selected: bool) {
		self.tabs.lock().push((params, selected));
	}
}

/// Keeps icon callbacks around until the test decides to answer them.
#[derive(Default)]
pub struct DeferredIconFetcher {
	pub tasks: Mutex<Vec<(PidlAbsolute, IconCallback)>>,
}

impl DeferredIconFetcher {
	pub fn answer(&self, index: usize, icon: i32) {
		let (_, callback) = self.tasks.lock().remove(index);
		callback(icon);
	}

	pub fn answer_all(&self, icon: i32) {
		let tasks = std::mem::take(&mut *self.tasks.lock());
		for (_, callback) in tasks {
			callback(icon);
		}
	}
}

impl IconFetcher for DeferredIconFetcher {
	fn queue_icon_task(&self, pidl: &PidlAbsolute, callback: IconCallback) {
		self.tasks.lock().push((pidl.clone(), callback));
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
	Started(NavigationId),
	WillCommit(NavigationId),
	Committed(NavigationId),
	ItemsAvailable(NavigationId),
	Completed(NavigationId),
	Failed(NavigationId),
	Cancelled(NavigationId),
	Stopped,
}

/// Records every navigation signal, in emission order.
pub struct NavigationRecorder {
	pub events: Arc<Mutex<Vec<Recorded>>>,
	pub committed: Arc<Mutex<Vec<NavigationRequest>>>,
	_connections: Vec<ScopedConnection>,
}

impl NavigationRecorder {
	pub fn attach(manager: &NavigationManager) -> Self {
		use sn_core::{ConnectPosition::AtBack, SlotGroup::Default as DefaultGroup};

		let events = Arc::new(Mutex::new(Vec::new()));
		let committed = Arc::new(Mutex::new(Vec::new()));

		let record = |to: fn(NavigationId) -> Recorded| {
			let events = Arc::clone(&events);
			move |request: &NavigationRequest| events.lock().push(to(request.id()))
		};

		let connections: Vec<Connection> = vec![
			manager.add_navigation_started_observer(record(Recorded::Started), AtBack, DefaultGroup),
			manager.add_navigation_will_commit_observer(record(Recorded::WillCommit), AtBack, DefaultGroup),
			manager.add_navigation_committed_observer(
				{
					let committed = Arc::clone(&committed);
					let record = record(Recorded::Committed);
					move |request| {
						committed.lock().push(request.clone());
						record(request);
					}
				},
				AtBack,
				DefaultGroup,
			),
			manager.add_navigation_items_available_observer(
				record(Recorded::ItemsAvailable),
				AtBack,
				DefaultGroup,
			),
			manager.add_navigation_completed_observer(record(Recorded::Completed), AtBack, DefaultGroup),
			manager.add_navigation_failed_observer(record(Recorded::Failed), AtBack, DefaultGroup),
			manager.add_navigation_cancelled_observer(record(Recorded::Cancelled), AtBack, DefaultGroup),
			manager.add_navigations_stopped_observer(
				{
					let events = Arc::clone(&events);
					move |_| events.lock().push(Recorded::Stopped)
				},
				AtBack,
				DefaultGroup,
			),
		];

		Self {
			events,
			committed,
			_connections: connections.into_iter().map(ScopedConnection::from).collect(),
		}
	}

	pub fn take(&self) -> Vec<Recorded> {
		std::mem::take(&mut *self.events.lock())
	}

	pub fn num_committed(&self) -> usize {
		self.committed.lock().len()
	}

	pub fn last_committed(&self) -> Option<NavigationRequest> {
		self.committed.lock().last().cloned()
	}
}
