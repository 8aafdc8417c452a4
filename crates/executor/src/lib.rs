//! Execution contexts.
//!
//! The navigation engine runs enumeration work on one context and hands results back to
//! the context that started it (usually the UI thread). Both sides are modelled by the
//! [`Executor`] trait: a place jobs can be posted to, without any way to wait for them.

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

use std::sync::Arc;

mod channel;
mod manual;
mod runtime;

pub use channel::ChannelExecutor;
pub use manual::ManualExecutor;
pub use runtime::TokioExecutor;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Somewhere jobs run.
///
/// Posting never blocks and never runs the job inline. Jobs posted from the same thread
/// run in the order they were posted, unless the executor runs them in parallel.
pub trait Executor: Send + Sync + 'static {
	fn post(&self, job: Job);
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
	fn post(&self, job: Job) {
		(**self).post(job);
	}
}
