//! Navigation and shell enumeration engine.
//!
//! A [`NavigationManager`] enumerates locations on a background executor and commits them
//! on the original executor, [`ShellNavigationController`] keeps back/forward history on
//! top of it and [`ShellEntryCollection`] mirrors a lazily expanded part of the namespace,
//! kept in sync through directory watchers.

#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod logging;
pub mod navigation;
pub mod shell_entry;
pub mod signal;

pub use config::{ConfigError, EngineConfig, NavigationSettings};
pub use context::ShellContext;
pub use navigation::{
	HistoryEntry, HistoryEntryId, HistoryEntryType, NavigateParams, NavigationError,
	NavigationId, NavigationManager, NavigationMode, NavigationRequest, NavigationType,
	ShellNavigationController,
};
pub use shell_entry::{EntryId, RemovedEntry, ShellEntry, ShellEntryCollection};
pub use signal::{ConnectPosition, Connection, ScopedConnection, Signal, SlotGroup};
