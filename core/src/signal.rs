//! Typed observer registries.
//!
//! A [`Signal`] keeps its slots sorted by [`SlotGroup`] and, within a group, by the
//! [`ConnectPosition`] they were connected with. Emission snapshots the slots and invokes
//! them with no lock held, so a slot may connect, disconnect or emit again.

use std::{
	fmt,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Weak,
	},
};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SlotGroup {
	HighestPriority,
	HighPriority,
	#[default]
	Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectPosition {
	AtFront,
	#[default]
	AtBack,
}

type SlotFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Slot<T: ?Sized> {
	id: u64,
	group: SlotGroup,
	is_connected: Arc<AtomicBool>,
	callback: SlotFn<T>,
}

struct Slots<T: ?Sized> {
	next_id: u64,
	entries: Vec<Slot<T>>,
}

trait Disconnect: Send + Sync {
	fn disconnect(&self, id: u64);
}

impl<T: ?Sized + 'static> Disconnect for Mutex<Slots<T>> {
	fn disconnect(&self, id: u64) {
		self.lock().entries.retain(|slot| slot.id != id);
	}
}

pub struct Signal<T: ?Sized> {
	slots: Arc<Mutex<Slots<T>>>,
}

impl<T: ?Sized + 'static> Default for Signal<T> {
	fn default() -> Self {
		Self {
			slots: Arc::new(Mutex::new(Slots {
				next_id: 0,
				entries: Vec::new(),
			})),
		}
	}
}

impl<T: ?Sized> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("num_slots", &self.slots.lock().entries.len())
			.finish()
	}
}

impl<T: ?Sized + 'static> Signal<T> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn connect(
		&self,
		callback: impl Fn(&T) + Send + Sync + 'static,
		position: ConnectPosition,
		group: SlotGroup,
	) -> Connection {
		let mut slots = self.slots.lock();
		let id = slots.next_id;
		slots.next_id += 1;

		let index = match position {
			ConnectPosition::AtFront => slots.entries.iter().position(|slot| slot.group >= group),
			ConnectPosition::AtBack => slots.entries.iter().position(|slot| slot.group > group),
		}
		.unwrap_or(slots.entries.len());

		let is_connected = Arc::new(AtomicBool::new(true));
		slots.entries.insert(
			index,
			Slot {
				id,
				group,
				is_connected: Arc::clone(&is_connected),
				callback: Arc::new(callback),
			},
		);

		let weak_slots: Weak<dyn Disconnect> = Arc::downgrade(&self.slots) as Weak<dyn Disconnect>;

		Connection {
			id,
			is_connected,
			slots: weak_slots,
		}
	}

	/// Connects at the back of the default group.
	pub fn connect_default(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Connection {
		self.connect(callback, ConnectPosition::AtBack, SlotGroup::Default)
	}

	pub fn emit(&self, args: &T) {
		let snapshot = self
			.slots
			.lock()
			.entries
			.iter()
			.map(|slot| (Arc::clone(&slot.is_connected), Arc::clone(&slot.callback)))
			.collect::<Vec<_>>();

		for (is_connected, callback) in snapshot {
			// A slot disconnected by an earlier slot of this same emission is skipped
			if is_connected.load(Ordering::Acquire) {
				callback(args);
			}
		}
	}

	#[must_use]
	pub fn num_slots(&self) -> usize {
		self.slots.lock().entries.len()
	}
}

/// Handle to a connected slot. Dropping it keeps the slot connected, see
/// [`ScopedConnection`] for the opposite.
#[must_use = "dropping a connection doesn't disconnect it, use a ScopedConnection for that"]
pub struct Connection {
	id: u64,
	is_connected: Arc<AtomicBool>,
	slots: Weak<dyn Disconnect>,
}

impl Connection {
	pub fn disconnect(&self) {
		self.is_connected.store(false, Ordering::Release);
		if let Some(slots) = self.slots.upgrade() {
			slots.disconnect(self.id);
		}
	}

	#[must_use]
	pub fn is_connected(&self) -> bool {
		self.is_connected.load(Ordering::Acquire) && self.slots.strong_count() > 0
	}
}

impl fmt::Debug for Connection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Connection")
			.field("id", &self.id)
			.field("is_connected", &self.is_connected())
			.finish()
	}
}

/// Disconnects its slot when dropped.
#[derive(Debug)]
pub struct ScopedConnection(Connection);

impl ScopedConnection {
	#[must_use]
	pub fn is_connected(&self) -> bool {
		self.0.is_connected()
	}
}

impl From<Connection> for ScopedConnection {
	fn from(connection: Connection) -> Self {
		Self(connection)
	}
}

impl Drop for ScopedConnection {
	fn drop(&mut self) {
		self.0.disconnect();
	}
}
