//! Shell namespace primitives.
//!
//! Items in a namespace are addressed by [`PidlAbsolute`]s, an ordered list of item ids
//! starting at the namespace root. Everything that has to touch a concrete namespace goes
//! through the [`ShellNamespace`], [`ShellEnumerator`] and [`PidlUpdater`] traits, so the
//! navigation engine can run against the real file system or against
//! [`MemoryNamespace`] in tests.

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

mod error;
mod filesystem;
mod filter;
mod memory;
mod namespace;
mod pidl;

pub use error::{FileIOError, NamespaceError};
pub use filesystem::FileSystemNamespace;
pub use filter::{HiddenItemPolicy, ItemType, ShellItemFilter};
pub use memory::MemoryNamespace;
pub use namespace::{DisplayNameKind, PidlUpdater, ShellEnumerator, ShellNamespace};
pub use pidl::{Attributes, ItemMetadata, PidlAbsolute, PidlChild};

pub use tokio_util::sync::CancellationToken;
