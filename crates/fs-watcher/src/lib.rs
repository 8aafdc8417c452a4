//! Directory watchers.
//!
//! A [`DirectoryWatcher`] reports changes to a directory and its items through a
//! [`Callback`], always invoked on the original executor it was created for. Two backends
//! exist: [`FileSystemWatcher`] on top of `notify`, with per-platform normalisation of
//! rename events, and [`ShellWatcher`], fed by in-process notifications through a
//! [`ShellChangeManager`].

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

mod backend;
mod error;
mod event;
mod filesystem;
mod shell;
mod watcher;

pub mod platform;

pub use backend::{create_watcher_factory, WatcherBackend};
pub use error::WatcherError;
pub use event::{
	Behavior, Callback, ChangeKind, Event, Filters, FsEvent, RawEventKind, RawNotifyEvent,
	RenameHalf,
};
pub use filesystem::{FileSystemWatcher, FileSystemWatcherFactory};
pub use shell::{ShellChange, ShellChangeManager, ShellWatcher, ShellWatcherFactory, WatchId};
pub use watcher::{DirectoryWatcher, DirectoryWatcherFactory};
