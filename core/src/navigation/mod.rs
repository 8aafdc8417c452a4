//! Navigation: starting, committing and remembering locations.

mod controller;
mod events;
mod history;
mod manager;
mod params;
mod request;

pub use controller::{
	IconCallback, IconFetcher, NavigationError, NavigationMode, ShellNavigationController,
	TabNavigation,
};
pub use history::{HistoryEntry, HistoryEntryId, PreservedHistoryEntry};
pub use manager::NavigationManager;
pub use params::{HistoryEntryType, NavigateParams, NavigationType};
pub use request::{EnumerationOutcome, NavigationId, NavigationRequest, RequestState};
