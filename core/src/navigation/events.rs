use crate::{navigation::NavigationRequest, signal::Signal};

#[derive(Debug, Default)]
pub(crate) struct NavigationEvents {
	pub started: Signal<NavigationRequest>,
	pub will_commit: Signal<NavigationRequest>,
	pub committed: Signal<NavigationRequest>,
	pub items_available: Signal<NavigationRequest>,
	pub completed: Signal<NavigationRequest>,
	pub failed: Signal<NavigationRequest>,
	pub cancelled: Signal<NavigationRequest>,
	pub stopped: Signal<()>,
}
