mod errors;
pub mod inbox;
mod report;


use std::sync::{Arc, Mutex};

pub use crate::errors::Error;
pub use crate::errors::Result;
pub use crate::report::RunReport;
pub use crate::report::EXIT_CODE_UNKNOWN;

/// Listeners take the three resolved report fields as owned values, in the
/// order (stdout, stderr, exit_code).
type ListenerFn = Arc<dyn Fn(String, String, i32) + Send + Sync>;

/// Completion is the value [`Relay::deliver`] hands back once a report has
/// been dealt with: the unit of work is over, and the hosting environment
/// decides what that means (tear a worker down, or just keep serving).
///
/// The two variants mirror the only two states a delivery can observe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
	/// A listener was registered and has been invoked with the report.
	Dispatched,
	/// The listener slot was empty; the report was dropped.
	Discarded,
}

/// Relay hands inbound run reports to the currently registered listener.
///
/// One relay owns one listener slot.  Registration overwrites the slot
/// unconditionally (last writer wins), and nothing ever clears it behind
/// your back: a listener stays registered across any number of deliveries
/// until [`Relay::set_listener`] or [`Relay::clear_listener`] replaces it.
/// Deliveries that arrive while the slot is empty are dropped without
/// error -- there is no queue and no retry.
///
/// A `Relay` value is a cheap handle onto shared state: clone one into
/// whatever dispatches inbound messages (see [`crate::inbox::listen`]) and
/// keep another for registration.
///
/// # Examples
///
/// ```
/// use reportback::{Completion, Relay, RunReport};
///
/// let relay = Relay::new();
/// relay.set_listener(|stdout, _stderr, exit_code| {
///     print!("{stdout}");
///     assert_eq!(exit_code, 0);
/// });
///
/// let completion = relay.deliver(RunReport::new("hello\n", "", 0));
/// assert_eq!(completion, Completion::Dispatched);
/// ```
#[derive(Clone, Default)]
pub struct Relay {
	slot: Arc<Mutex<Option<ListenerFn>>>,
}

impl Relay {
	/// Creates a relay with an empty listener slot.
	pub fn new() -> Self {
		Relay::default()
	}

	/// Registers `listener`, discarding any previous listener without
	/// notification.  May be called at any point relative to deliveries;
	/// each delivery dispatches to whatever listener is current at that
	/// instant.
	pub fn set_listener(&self, listener: impl Fn(String, String, i32) + Send + Sync + 'static) {
		let mut slot = self.slot.lock().expect("listener slot poisoned");
		*slot = Some(Arc::new(listener));
	}

	/// Empties the listener slot.  Subsequent deliveries are discarded until
	/// another listener is registered.
	pub fn clear_listener(&self) {
		let mut slot = self.slot.lock().expect("listener slot poisoned");
		*slot = None;
	}

	/// Dispatches `report` to the registered listener, synchronously, and
	/// reports completion.
	///
	/// An empty slot is policy, not failure: the report is silently dropped
	/// and [`Completion::Discarded`] comes back.  Missing-field handling
	/// already happened when the report was built ([`RunReport`] is total),
	/// so the listener always receives all three fields.
	///
	/// # Panics
	///
	/// A panic raised by the listener itself propagates to the caller
	/// unchanged; the relay does not catch, retry, or log it.  The
	/// panicking listener stays registered.
	pub fn deliver(&self, report: RunReport) -> Completion {
		// Snapshot the listener and release the lock before invoking:
		// the slot must not stay locked (nor get poisoned) while arbitrary
		// listener code runs.
		let listener = {
			let slot = self.slot.lock().expect("listener slot poisoned");
			slot.clone()
		};

		match listener {
			Some(listener) => {
				let RunReport {
					stdout,
					stderr,
					exit_code,
				} = report;
				listener(stdout, stderr, exit_code);
				Completion::Dispatched
			}
			None => Completion::Discarded,
		}
	}
}

impl std::fmt::Debug for Relay {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let occupied = match self.slot.lock() {
			Ok(slot) => slot.is_some(),
			Err(_) => return f.write_str("Relay { slot: <poisoned> }"),
		};
		f.debug_struct("Relay").field("listener", &occupied).finish()
	}
}
