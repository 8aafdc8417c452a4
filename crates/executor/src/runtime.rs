use crate::{Executor, Job};

use tokio::runtime::Handle;
use tracing::error;

/// Runs every job on the blocking pool of a tokio runtime.
///
/// Jobs run in parallel, so this is meant for enumeration work, never for the original
/// context.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
	handle: Handle,
}

impl TokioExecutor {
	#[must_use]
	pub const fn new(handle: Handle) -> Self {
		Self { handle }
	}

	/// Uses the runtime the caller is running on.
	///
	/// # Panics
	/// When called outside of a tokio runtime.
	#[must_use]
	pub fn current() -> Self {
		Self::new(Handle::current())
	}
}

impl Executor for TokioExecutor {
	fn post(&self, job: Job) {
		let handle = self.handle.spawn_blocking(job);

		self.handle.spawn(async move {
			if let Err(e) = handle.await {
				if e.is_panic() {
					error!(?e, "Job panicked on the blocking pool;");
				}
			}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use std::time::Duration;

	use tokio::{sync::oneshot, time::timeout};

	#[tokio::test(flavor = "multi_thread")]
	async fn runs_jobs_off_the_runtime_threads() {
		let executor = TokioExecutor::current();
		let (tx, rx) = oneshot::channel();

		executor.post(Box::new(move || {
			let _ = tx.send(std::thread::current().id());
		}));

		let job_thread = timeout(Duration::from_secs(5), rx).await.unwrap().unwrap();
		assert_ne!(job_thread, std::thread::current().id());
	}
}
