use crate::navigation::NavigateParams;

use std::{fmt, sync::Arc};

use sn_shell::{CancellationToken, PidlChild};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NavigationId(pub(crate) u64);

impl fmt::Display for NavigationId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
	NotStarted,
	Started,
	EnumerationFinished,
	WillCommit,
	Committed,
	Failed,
	Cancelled,
}

impl RequestState {
	const fn can_transition_to(self, next: Self) -> bool {
		matches!(
			(self, next),
			(Self::NotStarted, Self::Started)
				| (Self::Started, Self::EnumerationFinished)
				| (
					Self::EnumerationFinished,
					Self::WillCommit | Self::Failed | Self::Cancelled
				) | (Self::WillCommit, Self::Committed)
		)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumerationOutcome {
	Succeeded,
	/// Error text of the failed enumeration.
	Failed(String),
	Stopped,
}

/// A navigation owned by the [`crate::NavigationManager`].
///
/// Observers get snapshots of it. [`NavigationRequest::stopped`] is live though, as the
/// snapshot shares its stop token with the manager's copy.
#[derive(Debug, Clone)]
pub struct NavigationRequest {
	id: NavigationId,
	params: NavigateParams,
	state: RequestState,
	items: Arc<[PidlChild]>,
	outcome: Option<EnumerationOutcome>,
	stop_token: CancellationToken,
}

impl NavigationRequest {
	pub(crate) fn new(id: NavigationId, params: NavigateParams, stop_token: CancellationToken) -> Self {
		Self {
			id,
			params,
			state: RequestState::NotStarted,
			items: Arc::from(Vec::new()),
			outcome: None,
			stop_token,
		}
	}

	#[must_use]
	pub const fn id(&self) -> NavigationId {
		self.id
	}

	#[must_use]
	pub const fn params(&self) -> &NavigateParams {
		&self.params
	}

	#[must_use]
	pub const fn state(&self) -> RequestState {
		self.state
	}

	/// Items found by the enumeration, empty until it finishes.
	#[must_use]
	pub fn items(&self) -> &[PidlChild] {
		&self.items
	}

	#[must_use]
	pub const fn outcome(&self) -> Option<&EnumerationOutcome> {
		self.outcome.as_ref()
	}

	#[must_use]
	pub fn stopped(&self) -> bool {
		self.stop_token.is_cancelled()
	}

	pub(crate) const fn stop_token(&self) -> &CancellationToken {
		&self.stop_token
	}

	pub(crate) fn set_state(&mut self, next: RequestState) {
		debug_assert!(
			self.state.can_transition_to(next),
			"invalid navigation request transition: {:?} -> {next:?}",
			self.state
		);
		self.state = next;
	}

	pub(crate) fn finish_enumeration(
		&mut self,
		params: NavigateParams,
		items: Vec<PidlChild>,
		outcome: EnumerationOutcome,
	) {
		self.set_state(RequestState::EnumerationFinished);
		self.params = params;
		self.items = Arc::from(items);
		self.outcome = Some(outcome);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use sn_shell::PidlAbsolute;

	fn request() -> NavigationRequest {
		NavigationRequest::new(
			NavigationId(0),
			NavigateParams::normal(PidlAbsolute::root()),
			CancellationToken::new(),
		)
	}

	#[test]
	fn walks_the_commit_path() {
		let mut request = request();
		request.set_state(RequestState::Started);
		request.finish_enumeration(
			request.params().clone(),
			vec![PidlChild::new("a")],
			EnumerationOutcome::Succeeded,
		);
		request.set_state(RequestState::WillCommit);
		request.set_state(RequestState::Committed);

		assert_eq!(request.state(), RequestState::Committed);
		assert_eq!(request.items().len(), 1);
		assert_eq!(request.outcome(), Some(&EnumerationOutcome::Succeeded));
	}

	#[test]
	#[should_panic(expected = "invalid navigation request transition")]
	#[cfg(debug_assertions)]
	fn asserts_on_invalid_transitions() {
		let mut request = request();
		request.set_state(RequestState::Committed);
	}

	#[test]
	fn stopped_follows_the_token() {
		let token = CancellationToken::new();
		let request = NavigationRequest::new(
			NavigationId(1),
			NavigateParams::normal(PidlAbsolute::root()),
			token.child_token(),
		);
		let snapshot = request.clone();

		assert!(!snapshot.stopped());
		token.cancel();
		assert!(snapshot.stopped());
	}
}
