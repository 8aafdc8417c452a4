use crate::{Executor, Job};

use std::thread::{self, ThreadId};

use async_channel as chan;
use tracing::{trace, warn};

/// A multi-producer queue drained by the thread that owns it.
///
/// This is the usual original context: any thread may post, but jobs only run where
/// [`ChannelExecutor::run_pending`] or [`ChannelExecutor::run`] is called.
pub struct ChannelExecutor {
	jobs_tx: chan::Sender<Job>,
	jobs_rx: chan::Receiver<Job>,
	owner: ThreadId,
}

impl Default for ChannelExecutor {
	fn default() -> Self {
		Self::new()
	}
}

impl ChannelExecutor {
	#[must_use]
	pub fn new() -> Self {
		let (jobs_tx, jobs_rx) = chan::unbounded();

		Self {
			jobs_tx,
			jobs_rx,
			owner: thread::current().id(),
		}
	}

	/// Runs every job queued so far, returning how many ran.
	pub fn run_pending(&self) -> usize {
		self.check_owner();

		let mut ran = 0;
		while let Ok(job) = self.jobs_rx.try_recv() {
			job();
			ran += 1;
		}

		ran
	}

	/// Runs jobs as they arrive until the executor is closed.
	pub async fn run(&self) {
		while let Ok(job) = self.jobs_rx.recv().await {
			job();
		}

		trace!("Channel executor closed;");
	}

	/// Stops accepting jobs; [`ChannelExecutor::run`] returns once the queue is drained.
	pub fn close(&self) {
		self.jobs_tx.close();
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.jobs_rx.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.jobs_rx.is_empty()
	}

	fn check_owner(&self) {
		if thread::current().id() != self.owner {
			warn!("Channel executor drained outside of its owning thread;");
			debug_assert!(false, "channel executor drained outside of its owning thread");
		}
	}
}

impl Executor for ChannelExecutor {
	fn post(&self, job: Job) {
		if self.jobs_tx.try_send(job).is_err() {
			trace!("Dropping job posted to a closed executor;");
		}
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
	fn jobs_from_other_threads_run_on_owner() {
		let executor = Arc::new(ChannelExecutor::new());
		let owner = thread::current().id();
		let ran_on_owner = Arc::new(AtomicUsize::new(0));

		let handles = (0..4)
			.map(|_| {
				let executor = Arc::clone(&executor);
				let ran_on_owner = Arc::clone(&ran_on_owner);
				thread::spawn(move || {
					executor.post(Box::new(move || {
						if thread::current().id() == owner {
							ran_on_owner.fetch_add(1, Ordering::SeqCst);
						}
					}));
				})
			})
			.collect::<Vec<_>>();

		for handle in handles {
			handle.join().unwrap();
		}

		assert_eq!(executor.len(), 4);
		assert_eq!(executor.run_pending(), 4);
		assert_eq!(ran_on_owner.load(Ordering::SeqCst), 4);
	}

	#[tokio::test]
	async fn run_stops_when_closed() {
		let executor = ChannelExecutor::new();
		let counter = Arc::new(AtomicUsize::new(0));

		for _ in 0..3 {
			let counter = Arc::clone(&counter);
			executor.post(Box::new(move || {
				counter.fetch_add(1, Ordering::SeqCst);
			}));
		}
		executor.close();
		executor.post(Box::new(|| unreachable!("posted after close")));

		executor.run().await;
		assert_eq!(counter.load(Ordering::SeqCst), 3);
	}
}
