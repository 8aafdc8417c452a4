//! Navigation manager integration tests
//!
//! Enumerations run on a stepped executor and continuations on a manual one, so each test
//! decides exactly in which order navigations finish.

mod helpers;

use helpers::{NavigationRecorder, Recorded, SimulatedFileSystem};
use sn_core::{
	navigation::{EnumerationOutcome, RequestState},
	NavigateParams, NavigationSettings,
};
use sn_shell::{Attributes, HiddenItemPolicy, PidlAbsolute};
use tracing_test::traced_test;

#[test]
#[traced_test]
fn newer_navigation_wins_the_race() {
	let fs = SimulatedFileSystem::new();
	let a = fs.add_folder(&PidlAbsolute::root(), "a");
	let b = fs.add_folder(&PidlAbsolute::root(), "b");
	fs.add_file(&b, "file.txt");

	let manager = fs.manager();
	let recorder = NavigationRecorder::attach(&manager);

	let nav_a = manager.start_navigation(NavigateParams::normal(a));
	let nav_b = manager.start_navigation(NavigateParams::normal(b.clone()));
	assert_eq!(manager.num_pending_navigations(), 2);
	assert_eq!(manager.num_active_navigations(), 2);

	// B finishes first and commits, stopping A
	assert!(fs.enumeration.run_newest());
	fs.original.run_all();

	assert_eq!(
		recorder.take(),
		vec![
			Recorded::Started(nav_a),
			Recorded::Started(nav_b),
			Recorded::WillCommit(nav_b),
			Recorded::Committed(nav_b),
			Recorded::ItemsAvailable(nav_b),
			Recorded::Completed(nav_b),
		]
	);

	let committed = recorder.last_committed().unwrap();
	assert_eq!(committed.params().pidl, b);
	assert_eq!(committed.state(), RequestState::Committed);
	assert_eq!(committed.items().len(), 1);
	assert!(manager.any_navigations_committed());

	let pending = manager.pending_navigations();
	assert_eq!(pending.len(), 1);
	assert!(pending[0].stopped());
	assert_eq!(manager.num_active_navigations(), 0);
	assert!(!manager.has_any_active_navigations());

	// A finishes later and is dropped
	fs.settle();
	assert_eq!(recorder.take(), vec![Recorded::Cancelled(nav_a)]);
	assert_eq!(recorder.num_committed(), 1);
	assert!(!manager.has_any_pending_navigations());
}

#[test]
fn only_the_last_issued_navigation_commits() {
	let orders: [&[usize]; 4] = [&[0, 1, 2, 3, 4], &[4, 3, 2, 1, 0], &[2, 4, 0, 3, 1], &[1, 0, 3, 2, 4]];

	for order in orders {
		let fs = SimulatedFileSystem::new();
		let manager = fs.manager();
		let recorder = NavigationRecorder::attach(&manager);

		let ids = (0..order.len())
			.map(|i| {
				let folder = fs.add_folder(&PidlAbsolute::root(), &format!("folder{i}"));
				manager.start_navigation(NavigateParams::normal(folder))
			})
			.collect::<Vec<_>>();

		let mut jobs = fs.enumeration.take_all().into_iter().map(Some).collect::<Vec<_>>();
		for &index in order {
			let job = jobs[index].take().unwrap();
			job();
			fs.original.run_all();
		}

		let events = recorder.take();
		let committed = events
			.iter()
			.filter_map(|event| match event {
				Recorded::Committed(id) => Some(*id),
				_ => None,
			})
			.collect::<Vec<_>>();
		let cancelled = events
			.iter()
			.filter(|event| matches!(event, Recorded::Cancelled(_)))
			.count();

		assert_eq!(committed, vec![ids[ids.len() - 1]], "order {order:?}");
		assert_eq!(cancelled, ids.len() - 1, "order {order:?}");
		assert!(!events.iter().any(|event| matches!(event, Recorded::Failed(_))));
		assert_eq!(manager.num_pending_navigations(), 0);
	}
}

#[test]
fn older_result_arriving_first_is_cancelled() {
	let fs = SimulatedFileSystem::new();
	let a = fs.add_folder(&PidlAbsolute::root(), "a");
	let b = fs.add_folder(&PidlAbsolute::root(), "b");
	let manager = fs.manager();
	let recorder = NavigationRecorder::attach(&manager);

	let nav_a = manager.start_navigation(NavigateParams::normal(a));
	let nav_b = manager.start_navigation(NavigateParams::normal(b.clone()));

	assert!(fs.enumeration.run_oldest());
	fs.original.run_all();
	assert_eq!(
		recorder.take(),
		vec![
			Recorded::Started(nav_a),
			Recorded::Started(nav_b),
			Recorded::Cancelled(nav_a),
		]
	);
	assert!(!manager.any_navigations_committed());

	fs.settle();
	assert_eq!(
		recorder.take(),
		vec![
			Recorded::WillCommit(nav_b),
			Recorded::Committed(nav_b),
			Recorded::ItemsAvailable(nav_b),
			Recorded::Completed(nav_b),
		]
	);
	assert_eq!(recorder.last_committed().unwrap().params().pidl, b);
}

#[test]
#[traced_test]
fn first_navigation_commits_even_if_it_fails() {
	let fs = SimulatedFileSystem::new();
	let broken = fs.add_folder(&PidlAbsolute::root(), "broken");
	fs.namespace.set_enumeration_fails(&broken, true);

	let manager = fs.manager();
	let recorder = NavigationRecorder::attach(&manager);

	let first = manager.start_navigation(NavigateParams::normal(broken.clone()));
	fs.settle();

	assert_eq!(
		recorder.take(),
		vec![
			Recorded::Started(first),
			Recorded::WillCommit(first),
			Recorded::Committed(first),
			Recorded::ItemsAvailable(first),
			Recorded::Completed(first),
		]
	);
	let committed = recorder.last_committed().unwrap();
	assert!(committed.items().is_empty());
	assert!(matches!(committed.outcome(), Some(EnumerationOutcome::Failed(_))));

	// Once something is shown, failures are reported and leave it alone
	let second = manager.start_navigation(NavigateParams::normal(broken));
	fs.settle();

	assert_eq!(
		recorder.take(),
		vec![Recorded::Started(second), Recorded::Failed(second)]
	);
	assert_eq!(recorder.num_committed(), 1);
}

#[test]
fn first_navigation_commits_even_if_stopped() {
	let fs = SimulatedFileSystem::new();
	let a = fs.add_folder(&PidlAbsolute::root(), "a");
	let manager = fs.manager();
	let recorder = NavigationRecorder::attach(&manager);

	let first = manager.start_navigation(NavigateParams::normal(a.clone()));
	let second = manager.start_navigation(NavigateParams::normal(a.clone()));
	manager.stop_loading();

	// Nothing committed yet, stopped navigations are still active
	assert_eq!(manager.num_active_navigations(), 2);
	assert!(manager.pending_navigations().iter().all(|request| request.stopped()));

	fs.settle();

	assert_eq!(
		recorder.take(),
		vec![
			Recorded::Started(first),
			Recorded::Started(second),
			Recorded::Stopped,
			Recorded::WillCommit(first),
			Recorded::Committed(first),
			Recorded::ItemsAvailable(first),
			Recorded::Completed(first),
			Recorded::Cancelled(second),
		]
	);
	assert_eq!(
		recorder.last_committed().unwrap().outcome(),
		Some(&EnumerationOutcome::Stopped)
	);

	// Stopping after the first commit cancels
	let third = manager.start_navigation(NavigateParams::normal(a));
	manager.stop_loading();
	assert_eq!(manager.num_active_navigations(), 0);
	fs.settle();

	assert_eq!(
		recorder.take(),
		vec![
			Recorded::Started(third),
			Recorded::Stopped,
			Recorded::Cancelled(third),
		]
	);
}

#[test]
fn stopped_first_navigation_keeps_its_items() {
	let fs = SimulatedFileSystem::new();
	let a = fs.add_folder(&PidlAbsolute::root(), "a");
	fs.add_file(&a, "x.txt");
	let manager = fs.manager();
	let recorder = NavigationRecorder::attach(&manager);

	manager.start_navigation(NavigateParams::normal(a));

	// The enumeration is done by the time the stop arrives
	fs.enumeration.run_all();
	manager.stop_loading();
	fs.original.run_all();

	let committed = recorder.last_committed().unwrap();
	assert_eq!(committed.outcome(), Some(&EnumerationOutcome::Stopped));
	assert_eq!(committed.items().len(), 1);
	assert_eq!(committed.items()[0].name(), "x.txt");
}

#[test]
fn links_are_followed() {
	let fs = SimulatedFileSystem::new();
	let target = fs.add_folder(&PidlAbsolute::root(), "target");
	fs.add_file(&target, "inside.txt");
	let link = fs.namespace.add_link(&PidlAbsolute::root(), "link", &target);

	let manager = fs.manager();
	let recorder = NavigationRecorder::attach(&manager);

	manager.start_navigation(NavigateParams::normal(link.clone()));
	fs.settle();

	let committed = recorder.last_committed().unwrap();
	assert_eq!(committed.params().request_pidl, link);
	assert_eq!(committed.params().pidl, target);
	assert_eq!(committed.items()[0].name(), "inside.txt");
}

#[test]
fn hidden_items_follow_the_settings() {
	let fs = SimulatedFileSystem::new();
	let folder = fs.add_folder(&PidlAbsolute::root(), "folder");
	fs.add_file(&folder, "visible");
	fs.add_item(&folder, "hidden", Attributes::HIDDEN);

	let names = |settings: NavigationSettings| {
		let manager = fs.manager_with_settings(settings);
		let recorder = NavigationRecorder::attach(&manager);
		manager.start_navigation(NavigateParams::normal(folder.clone()));
		fs.settle();

		let mut names = recorder
			.last_committed()
			.unwrap()
			.items()
			.iter()
			.map(|item| item.name().to_owned())
			.collect::<Vec<_>>();
		names.sort();
		names
	};

	assert_eq!(names(NavigationSettings::default()), vec!["visible"]);
	assert_eq!(
		names(NavigationSettings {
			hidden_item_policy: HiddenItemPolicy::Include
		}),
		vec!["hidden", "visible"]
	);
}

#[test]
fn dropped_manager_finishes_nothing() {
	let fs = SimulatedFileSystem::new();
	let a = fs.add_folder(&PidlAbsolute::root(), "a");
	let manager = fs.manager();
	let recorder = NavigationRecorder::attach(&manager);

	let id = manager.start_navigation(NavigateParams::normal(a));
	drop(manager);
	fs.settle();

	assert_eq!(recorder.take(), vec![Recorded::Started(id)]);
}

#[test]
fn latest_views_skip_stopped_navigations_once_committed() {
	let fs = SimulatedFileSystem::new();
	let a = fs.add_folder(&PidlAbsolute::root(), "a");
	let manager = fs.manager();

	manager.start_navigation(NavigateParams::normal(a.clone()));
	fs.settle();
	assert!(manager.maybe_latest_pending_navigation().is_none());

	let stopped = manager.start_navigation(NavigateParams::normal(a.clone()));
	manager.stop_loading();
	let running = manager.start_navigation(NavigateParams::normal(a));

	assert_eq!(
		manager.maybe_latest_pending_navigation().map(|request| request.id()),
		Some(running)
	);
	assert_eq!(
		manager.maybe_latest_active_navigation().map(|request| request.id()),
		Some(running)
	);
	assert_eq!(
		manager
			.active_navigations()
			.iter()
			.map(|request| request.id())
			.collect::<Vec<_>>(),
		vec![running]
	);
	assert_eq!(manager.pending_navigations()[0].id(), stopped);
}
