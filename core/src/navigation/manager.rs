use crate::{
	config::NavigationSettings,
	context::ShellContext,
	navigation::{
		events::NavigationEvents, EnumerationOutcome, NavigateParams, NavigationId,
		NavigationRequest, RequestState,
	},
	signal::{ConnectPosition, Connection, SlotGroup},
};

use std::{
	mem,
	sync::{Arc, Weak},
};

use parking_lot::Mutex;
use sn_executor::Executor;
use sn_shell::{
	CancellationToken, HiddenItemPolicy, ItemType, NamespaceError, PidlChild, ShellEnumerator,
	ShellNamespace,
};
use tracing::{debug, error, instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
	Commit,
	Fail,
	Cancel,
}

struct State {
	next_navigation_id: u64,
	any_navigations_committed: bool,
	/// Oldest first.
	pending: Vec<NavigationRequest>,
	/// Parent of every pending request's stop token.
	scope: CancellationToken,
}

struct Inner {
	context: ShellContext,
	settings: NavigationSettings,
	enumeration_executor: Arc<dyn Executor>,
	original_executor: Arc<dyn Executor>,
	events: NavigationEvents,
	state: Mutex<State>,
}

/// Runs navigations: enumerates on the enumeration executor, then commits, fails or
/// cancels on the original executor.
///
/// Only the latest navigation still running can commit. One that finishes while a newer,
/// unstopped navigation is pending is cancelled, and committing stops every older one.
#[derive(Clone)]
pub struct NavigationManager {
	inner: Arc<Inner>,
}

impl NavigationManager {
	pub fn new(
		context: ShellContext,
		enumeration_executor: Arc<dyn Executor>,
		original_executor: Arc<dyn Executor>,
		settings: NavigationSettings,
	) -> Self {
		Self {
			inner: Arc::new(Inner {
				context,
				settings,
				enumeration_executor,
				original_executor,
				events: NavigationEvents::default(),
				state: Mutex::new(State {
					next_navigation_id: 0,
					any_navigations_committed: false,
					pending: Vec::new(),
					scope: CancellationToken::new(),
				}),
			}),
		}
	}

	#[instrument(skip_all, fields(pidl = %params.pidl))]
	pub fn start_navigation(&self, params: NavigateParams) -> NavigationId {
		let request = {
			let mut state = self.inner.state.lock();
			let id = NavigationId(state.next_navigation_id);
			state.next_navigation_id += 1;

			let mut request = NavigationRequest::new(id, params, state.scope.child_token());
			request.set_state(RequestState::Started);
			state.pending.push(request.clone());

			request
		};

		let id = request.id();
		debug!(navigation_id = %id, "Navigation started;");
		self.inner.events.started.emit(&request);

		let job = EnumerationJob {
			id,
			params: request.params().clone(),
			stop_token: request.stop_token().clone(),
			namespace: Arc::clone(self.inner.context.namespace()),
			enumerator: Arc::clone(self.inner.context.enumerator()),
			hidden_item_policy: self.inner.settings.hidden_item_policy,
			original_executor: Arc::clone(&self.inner.original_executor),
			manager: Arc::downgrade(&self.inner),
		};
		self.inner.enumeration_executor.post(Box::new(move || job.run()));

		id
	}

	/// Stops every pending navigation without starting a new one.
	#[instrument(skip(self))]
	pub fn stop_loading(&self) {
		let old_scope = {
			let mut state = self.inner.state.lock();
			mem::replace(&mut state.scope, CancellationToken::new())
		};
		old_scope.cancel();

		debug!("Stopped loading;");
		self.inner.events.stopped.emit(&());
	}

	#[must_use]
	pub fn pending_navigations(&self) -> Vec<NavigationRequest> {
		self.inner.state.lock().pending.clone()
	}

	/// Pending navigations that may still commit, oldest first.
	#[must_use]
	pub fn active_navigations(&self) -> Vec<NavigationRequest> {
		let state = self.inner.state.lock();
		state
			.pending
			.iter()
			.filter(|request| Self::is_active(&state, request))
			.cloned()
			.collect()
	}

	#[must_use]
	pub fn maybe_latest_pending_navigation(&self) -> Option<NavigationRequest> {
		self.inner.state.lock().pending.last().cloned()
	}

	#[must_use]
	pub fn maybe_latest_active_navigation(&self) -> Option<NavigationRequest> {
		let state = self.inner.state.lock();
		state
			.pending
			.iter()
			.rev()
			.find(|request| Self::is_active(&state, request))
			.cloned()
	}

	#[must_use]
	pub fn num_pending_navigations(&self) -> usize {
		self.inner.state.lock().pending.len()
	}

	#[must_use]
	pub fn num_active_navigations(&self) -> usize {
		let state = self.inner.state.lock();
		state
			.pending
			.iter()
			.filter(|request| Self::is_active(&state, request))
			.count()
	}

	#[must_use]
	pub fn has_any_pending_navigations(&self) -> bool {
		!self.inner.state.lock().pending.is_empty()
	}

	#[must_use]
	pub fn has_any_active_navigations(&self) -> bool {
		self.num_active_navigations() > 0
	}

	#[must_use]
	pub fn any_navigations_committed(&self) -> bool {
		self.inner.state.lock().any_navigations_committed
	}

	// Until something commits every pending navigation is active, including stopped ones,
	// as the first of them to finish will be committed regardless.
	fn is_active(state: &State, request: &NavigationRequest) -> bool {
		!state.any_navigations_committed || !request.stopped()
	}

	pub fn add_navigation_started_observer(
		&self,
		observer: impl Fn(&NavigationRequest) + Send + Sync + 'static,
		position: ConnectPosition,
		group: SlotGroup,
	) -> Connection {
		self.inner.events.started.connect(observer, position, group)
	}

	pub fn add_navigation_will_commit_observer(
		&self,
		observer: impl Fn(&NavigationRequest) + Send + Sync + 'static,
		position: ConnectPosition,
		group: SlotGroup,
	) -> Connection {
		self.inner.events.will_commit.connect(observer, position, group)
	}

	pub fn add_navigation_committed_observer(
		&self,
		observer: impl Fn(&NavigationRequest) + Send + Sync + 'static,
		position: ConnectPosition,
		group: SlotGroup,
	) -> Connection {
		self.inner.events.committed.connect(observer, position, group)
	}

	pub fn add_navigation_items_available_observer(
		&self,
		observer: impl Fn(&NavigationRequest) + Send + Sync + 'static,
		position: ConnectPosition,
		group: SlotGroup,
	) -> Connection {
		self.inner.events.items_available.connect(observer, position, group)
	}

	pub fn add_navigation_completed_observer(
		&self,
		observer: impl Fn(&NavigationRequest) + Send + Sync + 'static,
		position: ConnectPosition,
		group: SlotGroup,
	) -> Connection {
		self.inner.events.completed.connect(observer, position, group)
	}

	pub fn add_navigation_failed_observer(
		&self,
		observer: impl Fn(&NavigationRequest) + Send + Sync + 'static,
		position: ConnectPosition,
		group: SlotGroup,
	) -> Connection {
		self.inner.events.failed.connect(observer, position, group)
	}

	pub fn add_navigation_cancelled_observer(
		&self,
		observer: impl Fn(&NavigationRequest) + Send + Sync + 'static,
		position: ConnectPosition,
		group: SlotGroup,
	) -> Connection {
		self.inner.events.cancelled.connect(observer, position, group)
	}

	pub fn add_navigations_stopped_observer(
		&self,
		observer: impl Fn(&()) + Send + Sync + 'static,
		position: ConnectPosition,
		group: SlotGroup,
	) -> Connection {
		self.inner.events.stopped.connect(observer, position, group)
	}
}

impl Inner {
	fn on_enumeration_finished(
		&self,
		id: NavigationId,
		params: NavigateParams,
		result: Result<Vec<PidlChild>, NamespaceError>,
	) {
		let (request, resolution) = {
			let mut state = self.state.lock();
			let any_navigations_committed = state.any_navigations_committed;
			let superseded = state
				.pending
				.iter()
				.any(|other| other.id() > id && !other.stopped());

			let Some(request) = state.pending.iter_mut().find(|request| request.id() == id) else {
				error!(navigation_id = %id, "Finished navigation isn't pending;");
				debug_assert!(false, "finished navigation {id} isn't pending");
				return;
			};

			let (items, outcome) = match result {
				// Stopped after enumerating, the items are kept for a possible first commit
				Ok(items) if request.stopped() => (items, EnumerationOutcome::Stopped),
				Err(_) if request.stopped() => (Vec::new(), EnumerationOutcome::Stopped),
				Err(NamespaceError::Stopped) => (Vec::new(), EnumerationOutcome::Stopped),
				Err(e) => (Vec::new(), EnumerationOutcome::Failed(e.to_string())),
				Ok(items) => (items, EnumerationOutcome::Succeeded),
			};

			// Until something is shown, the latest navigation commits whatever happened to it.
			let resolution = match outcome {
				_ if superseded => Resolution::Cancel,
				_ if !any_navigations_committed => Resolution::Commit,
				EnumerationOutcome::Stopped => Resolution::Cancel,
				EnumerationOutcome::Failed(_) => Resolution::Fail,
				EnumerationOutcome::Succeeded => Resolution::Commit,
			};

			request.finish_enumeration(params, items, outcome);
			request.set_state(match resolution {
				Resolution::Commit => RequestState::WillCommit,
				Resolution::Fail => RequestState::Failed,
				Resolution::Cancel => RequestState::Cancelled,
			});
			let request = request.clone();

			if resolution == Resolution::Commit {
				state
					.pending
					.iter()
					.filter(|older| older.id() < id)
					.for_each(|older| older.stop_token().cancel());
				state.any_navigations_committed = true;
			}

			(request, resolution)
		};

		match resolution {
			Resolution::Commit => self.commit(request),
			Resolution::Fail => {
				debug!(navigation_id = %id, outcome = ?request.outcome(), "Navigation failed;");
				self.events.failed.emit(&request);
			}
			Resolution::Cancel => {
				debug!(navigation_id = %id, "Navigation cancelled;");
				self.events.cancelled.emit(&request);
			}
		}

		self.state.lock().pending.retain(|request| request.id() != id);
	}

	fn commit(&self, mut request: NavigationRequest) {
		let id = request.id();
		debug!(navigation_id = %id, pidl = %request.params().pidl, "Committing navigation;");

		self.events.will_commit.emit(&request);

		request.set_state(RequestState::Committed);
		if let Some(pending) = self
			.state
			.lock()
			.pending
			.iter_mut()
			.find(|pending| pending.id() == id)
		{
			pending.set_state(RequestState::Committed);
		}

		self.events.committed.emit(&request);
		self.events.items_available.emit(&request);
		self.events.completed.emit(&request);
	}
}

impl Drop for Inner {
	fn drop(&mut self) {
		self.state.get_mut().scope.cancel();
	}
}

/// Everything the enumeration executor needs, detached from the manager.
struct EnumerationJob {
	id: NavigationId,
	params: NavigateParams,
	stop_token: CancellationToken,
	namespace: Arc<dyn ShellNamespace>,
	enumerator: Arc<dyn ShellEnumerator>,
	hidden_item_policy: HiddenItemPolicy,
	original_executor: Arc<dyn Executor>,
	manager: Weak<Inner>,
}

impl EnumerationJob {
	fn run(self) {
		let Self {
			id,
			mut params,
			stop_token,
			namespace,
			enumerator,
			hidden_item_policy,
			original_executor,
			manager,
		} = self;

		match namespace.link_target(&params.pidl) {
			Ok(Some(target)) => {
				trace!(navigation_id = %id, %target, "Navigating to link target;");
				params.pidl = target;
			}
			Ok(None) => {}
			Err(e) => {
				debug!(?e, navigation_id = %id, "Failed to resolve link target, using requested location;");
			}
		}

		let result = enumerator.enumerate_directory(
			&params.pidl,
			ItemType::FoldersAndFiles,
			hidden_item_policy,
			&stop_token,
		);
		trace!(navigation_id = %id, ok = result.is_ok(), "Enumeration finished;");

		original_executor.post(Box::new(move || {
			if let Some(manager) = manager.upgrade() {
				manager.on_enumeration_finished(id, params, result);
			} else {
				trace!(navigation_id = %id, "Manager is gone, dropping navigation;");
			}
		}));
	}
}
