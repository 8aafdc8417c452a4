//! An in-memory file system whose changes are reported like a real watcher would.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use sn_core::{NavigationManager, NavigationSettings, ShellContext};
use sn_executor::{Executor, Job, ManualExecutor};
use sn_fs_watcher::{ShellChange, ShellChangeManager, ShellWatcherFactory};
use sn_shell::{Attributes, MemoryNamespace, PidlAbsolute, ShellNamespace};

/// Executor whose jobs can be run in any order, to make enumerations finish out of order.
#[derive(Default)]
pub struct SteppedExecutor {
	jobs: Mutex<VecDeque<Job>>,
}

impl SteppedExecutor {
	pub fn run_oldest(&self) -> bool {
		let job = self.jobs.lock().pop_front();
		job.map(|job| job()).is_some()
	}

	pub fn run_newest(&self) -> bool {
		let job = self.jobs.lock().pop_back();
		job.map(|job| job()).is_some()
	}

	pub fn run_all(&self) -> usize {
		let mut ran = 0;
		while self.run_oldest() {
			ran += 1;
		}
		ran
	}

	/// Removes every queued job, oldest first, so a test can run them in any order.
	pub fn take_all(&self) -> Vec<Job> {
		self.jobs.lock().drain(..).collect()
	}

	pub fn len(&self) -> usize {
		self.jobs.lock().len()
	}
}

impl Executor for SteppedExecutor {
	fn post(&self, job: Job) {
		self.jobs.lock().push_back(job);
	}
}

pub struct SimulatedFileSystem {
	pub namespace: Arc<MemoryNamespace>,
	pub changes: ShellChangeManager,
	pub enumeration: Arc<SteppedExecutor>,
	pub original: Arc<ManualExecutor>,
	pub context: ShellContext,
}

impl SimulatedFileSystem {
	pub fn new() -> Self {
		let namespace = Arc::new(MemoryNamespace::new());
		let enumeration = Arc::new(SteppedExecutor::default());
		let original = Arc::new(ManualExecutor::new());
		let changes = ShellChangeManager::new(Arc::clone(&original) as Arc<dyn Executor>);
		let context = ShellContext::from_namespace(
			Arc::clone(&namespace),
			Arc::new(ShellWatcherFactory::new(changes.clone())),
		);

		Self {
			namespace,
			changes,
			enumeration,
			original,
			context,
		}
	}

	pub fn manager(&self) -> NavigationManager {
		self.manager_with_settings(NavigationSettings::default())
	}

	pub fn manager_with_settings(&self, settings: NavigationSettings) -> NavigationManager {
		NavigationManager::new(
			self.context.clone(),
			Arc::clone(&self.enumeration) as Arc<dyn Executor>,
			Arc::clone(&self.original) as Arc<dyn Executor>,
			settings,
		)
	}

	/// Runs both executors until neither has anything left to do.
	pub fn settle(&self) {
		while self.enumeration.run_all() + self.original.run_all() > 0 {}
	}

	/// Delivers queued change notifications.
	pub fn deliver_changes(&self) {
		self.original.run_all();
	}

	fn is_folder(&self, pidl: &PidlAbsolute) -> bool {
		self.namespace
			.attributes(pidl)
			.is_ok_and(|attributes| attributes.contains(Attributes::FOLDER))
	}

	pub fn add_folder(&self, parent: &PidlAbsolute, name: &str) -> PidlAbsolute {
		self.add_item(parent, name, Attributes::FOLDER)
	}

	pub fn add_file(&self, parent: &PidlAbsolute, name: &str) -> PidlAbsolute {
		self.add_item(parent, name, Attributes::empty())
	}

	pub fn add_item(&self, parent: &PidlAbsolute, name: &str, attributes: Attributes) -> PidlAbsolute {
		let pidl = self.namespace.add_item(parent, name, attributes);
		self.changes.notify(ShellChange::created(
			pidl.without_metadata(),
			attributes.contains(Attributes::FOLDER),
		));
		pidl
	}

	pub fn rename(&self, pidl: &PidlAbsolute, new_name: &str) -> PidlAbsolute {
		let is_directory = self.is_folder(pidl);
		let renamed = self
			.namespace
			.rename_item(pidl, new_name)
			.expect("renamed item exists");
		self.changes.notify(ShellChange::renamed(
			pidl.without_metadata(),
			renamed.without_metadata(),
			is_directory,
		));
		renamed
	}

	pub fn update(&self, pidl: &PidlAbsolute, attributes: Attributes) -> PidlAbsolute {
		let updated = self
			.namespace
			.update_item(pidl, attributes)
			.expect("updated item exists");
		self.changes
			.notify(ShellChange::attributes_changed(pidl.without_metadata()));
		updated
	}

	pub fn remove(&self, pidl: &PidlAbsolute) {
		let is_directory = self.is_folder(pidl);
		assert!(self.namespace.remove_item(pidl));
		self.changes
			.notify(ShellChange::removed(pidl.without_metadata(), is_directory));
	}
}
