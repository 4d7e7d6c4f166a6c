use core::{cell::Cell, marker::PhantomData};
use std::{
	collections::VecDeque,
	panic::{catch_unwind, resume_unwind, AssertUnwindSafe},
	sync::Arc,
};

use scopeguard::guard;
use unwind_safe::try_eval;

use crate::{
	action::{panic_message, QueuedAction},
	enqueuer::Enqueuer,
	queue::Shared,
};

/// What [`Dispatcher::drain`] does when a queued callback panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PanicPolicy {
	/// Catch the panic, log it, count it in [`DrainReport::panicked`] and carry on with the rest of the batch.
	#[default]
	Isolate,
	/// Log the panic, then let it unwind out of [`Dispatcher::drain`].
	///
	/// The part of the batch that hadn't run yet is put back at the front of the queue,
	/// ahead of anything enqueued meanwhile, so it runs during the next drain.
	Propagate,
}

/// What one [`Dispatcher::drain`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[must_use = "Hosts may ignore this, but tests usually shouldn't."]
pub struct DrainReport {
	/// Number of callbacks that returned normally.
	pub ran: usize,
	/// Number of callbacks that panicked and were isolated.
	pub panicked: usize,
}

impl DrainReport {
	/// Whether this drain found no work at all.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.ran == 0 && self.panicked == 0
	}
}

/// The owner side of a main-thread dispatch queue.
///
/// # Logic
///
/// Every action enqueued before a [`.drain()`](`Dispatcher::drain`) call takes its batch runs during that call,
/// exactly once and in enqueue order. Actions enqueued while the batch runs (including by its own callbacks)
/// wait for the next call.
///
/// # Threading
///
/// Not [`Send`]: the constructing thread is the owner thread, and callbacks only ever run there.
/// Other threads get an [`Enqueuer`] via [`.enqueuer()`](`Dispatcher::enqueuer`).
///
/// Dropping the [`Dispatcher`] drops all still-pending actions unrun and closes its [`Enqueuer`]s.
#[derive(Debug)]
pub struct Dispatcher {
	shared: Arc<Shared>,
	panic_policy: PanicPolicy,
	draining: Cell<bool>,
	_owner_thread: PhantomData<*const ()>,
}

impl Default for Dispatcher {
	fn default() -> Self {
		Self::new()
	}
}

impl Dispatcher {
	/// Creates an empty [`Dispatcher`] owned by the current thread, with [`PanicPolicy::Isolate`].
	#[must_use]
	pub fn new() -> Self {
		Self::with_panic_policy(PanicPolicy::default())
	}

	/// Creates an empty [`Dispatcher`] owned by the current thread.
	#[must_use]
	pub fn with_panic_policy(panic_policy: PanicPolicy) -> Self {
		Self {
			shared: Arc::default(),
			panic_policy,
			draining: Cell::new(false),
			_owner_thread: PhantomData,
		}
	}

	/// A new handle that other threads can use to enqueue work here.
	#[must_use]
	pub fn enqueuer(&self) -> Enqueuer {
		Enqueuer {
			shared: Arc::clone(&self.shared),
		}
	}

	/// Queues `callback(argument)` from the owner thread itself.
	///
	/// This never runs `callback` immediately, even when called from within [`.drain()`](`Dispatcher::drain`).
	pub fn enqueue<A, F>(&self, callback: F, argument: A)
	where
		A: 'static + Send,
		F: 'static + Send + FnOnce(A),
	{
		let action = QueuedAction::new(callback, argument);
		tracing::trace!(callback = action.label(), "enqueued on the owner thread");
		self.shared
			.push(action)
			.expect("unreachable: the queue only closes when its `Dispatcher` drops");
	}

	/// Runs every action that is pending right now, in order, on the current (owner) thread.
	///
	/// Returns immediately if there's nothing to do. Never waits for new work.
	///
	/// Calls from within a callback that this method is currently running do nothing
	/// and return an empty [`DrainReport`].
	///
	/// # Panics
	///
	/// Iff a callback panics and the [`PanicPolicy`] is [`Propagate`](`PanicPolicy::Propagate`).
	pub fn drain(&self) -> DrainReport {
		if self.draining.get() {
			tracing::warn!("ignored re-entrant `drain` from inside a queued callback");
			return DrainReport::default();
		}

		let batch = self.shared.take_all();
		if batch.is_empty() {
			return DrainReport::default();
		}
		tracing::trace!(batch = batch.len(), "draining");

		self.draining.set(true);
		try_eval(|| match self.panic_policy {
			PanicPolicy::Isolate => Self::run_isolated(batch),
			PanicPolicy::Propagate => self.run_propagating(batch),
		})
		.finally(|()| self.draining.set(false))
	}

	fn run_isolated(batch: VecDeque<QueuedAction>) -> DrainReport {
		let mut report = DrainReport::default();
		for action in batch {
			let label = action.label();
			match catch_unwind(AssertUnwindSafe(|| action.run())) {
				Ok(()) => report.ran += 1,
				Err(payload) => {
					report.panicked += 1;
					tracing::error!(
						callback = label,
						panic = panic_message(&*payload),
						"queued callback panicked, continuing with the rest of the batch"
					);
				}
			}
		}
		report
	}

	fn run_propagating(&self, batch: VecDeque<QueuedAction>) -> DrainReport {
		let mut report = DrainReport::default();
		let mut remainder = guard(batch, |remainder| {
			if !remainder.is_empty() {
				self.shared.requeue_front(remainder);
			}
		});
		while let Some(action) = remainder.pop_front() {
			let label = action.label();
			if let Err(payload) = catch_unwind(AssertUnwindSafe(|| action.run())) {
				tracing::error!(
					callback = label,
					panic = panic_message(&*payload),
					requeued = remainder.len(),
					"queued callback panicked, requeueing the rest of the batch"
				);
				resume_unwind(payload)
			}
			report.ran += 1;
		}
		report
	}

	/// Number of actions currently waiting for a drain.
	#[must_use]
	pub fn len(&self) -> usize {
		self.shared.len()
	}

	/// Whether no actions are currently waiting for a drain.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// The [`PanicPolicy`] this [`Dispatcher`] was created with.
	#[must_use]
	pub fn panic_policy(&self) -> PanicPolicy {
		self.panic_policy
	}
}

impl Drop for Dispatcher {
	fn drop(&mut self) {
		let abandoned = self.shared.close();
		if !abandoned.is_empty() {
			tracing::debug!(abandoned = abandoned.len(), "dropping dispatcher with pending actions");
		}
	}
}
