use crate::{Executor, Job};

use std::{
	collections::VecDeque,
	sync::atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use tracing::trace;

/// An executor that only runs jobs when told to.
///
/// Tests use it to interleave the enumeration context and the original context
/// deterministically.
#[derive(Default)]
pub struct ManualExecutor {
	queue: Mutex<VecDeque<Job>>,
	is_shutdown: AtomicBool,
}

impl ManualExecutor {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Runs the oldest queued job. Returns `false` when the queue was empty.
	pub fn loop_once(&self) -> bool {
		// Released before running, the job may post more work
		let Some(job) = self.queue.lock().pop_front() else {
			return false;
		};

		job();

		true
	}

	/// Runs at most `max` jobs, returning how many ran.
	pub fn loop_n(&self, max: usize) -> usize {
		(0..max).take_while(|_| self.loop_once()).count()
	}

	/// Runs jobs until the queue is empty, including jobs posted by the jobs themselves.
	pub fn run_all(&self) -> usize {
		let mut ran = 0;
		while self.loop_once() {
			ran += 1;
		}

		ran
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.queue.lock().len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.queue.lock().is_empty()
	}

	/// Drops every queued job and rejects new ones.
	pub fn shutdown(&self) {
		self.is_shutdown.store(true, Ordering::Release);
		let dropped = std::mem::take(&mut *self.queue.lock());
		trace!(dropped = dropped.len(), "Manual executor shut down;");
	}
}

impl Executor for ManualExecutor {
	fn post(&self, job: Job) {
		if self.is_shutdown.load(Ordering::Acquire) {
			trace!("Dropping job posted to a shut down executor;");
			return;
		}

		self.queue.lock().push_back(job);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use std::sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	};

	#[test]
	fn runs_in_post_order() {
		let executor = ManualExecutor::new();
		let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

		for i in 0..3 {
			let order = Arc::clone(&order);
			executor.post(Box::new(move || order.lock().push(i)));
		}

		assert_eq!(executor.len(), 3);
		assert!(order.lock().is_empty());

		assert!(executor.loop_once());
		assert_eq!(*order.lock(), vec![0]);
		assert_eq!(executor.run_all(), 2);
		assert_eq!(*order.lock(), vec![0, 1, 2]);
		assert!(!executor.loop_once());
	}

	#[test]
	fn jobs_may_post_more_jobs() {
		let executor = Arc::new(ManualExecutor::new());
		let counter = Arc::new(AtomicUsize::new(0));

		let inner_executor = Arc::clone(&executor);
		let inner_counter = Arc::clone(&counter);
		executor.post(Box::new(move || {
			inner_counter.fetch_add(1, Ordering::SeqCst);
			let counter = Arc::clone(&inner_counter);
			inner_executor.post(Box::new(move || {
				counter.fetch_add(1, Ordering::SeqCst);
			}));
		}));

		assert_eq!(executor.loop_n(1), 1);
		assert_eq!(executor.len(), 1);
		assert_eq!(executor.run_all(), 1);
		assert_eq!(counter.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn shutdown_drops_jobs() {
		let executor = ManualExecutor::new();
		let counter = Arc::new(AtomicUsize::new(0));

		let first = Arc::clone(&counter);
		executor.post(Box::new(move || {
			first.fetch_add(1, Ordering::SeqCst);
		}));
		executor.shutdown();

		let second = Arc::clone(&counter);
		executor.post(Box::new(move || {
			second.fetch_add(1, Ordering::SeqCst);
		}));

		assert!(executor.is_empty());
		assert_eq!(executor.run_all(), 0);
		assert_eq!(counter.load(Ordering::SeqCst), 0);
	}
}
