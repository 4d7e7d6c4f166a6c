use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::{action::QueuedAction, enqueuer::EnqueueError};

/// The state every [`Enqueuer`](`crate::Enqueuer`) shares with its [`Dispatcher`](`crate::Dispatcher`).
///
/// The lock is held only to append, to take a batch or to put a batch's remainder back.
/// [`QueuedAction`]s are never run **or dropped** while it's held, since either may run arbitrary user code.
#[derive(Debug, Default)]
pub(crate) struct Shared {
	state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
	pending: VecDeque<QueuedAction>,
	closed: bool,
}

impl Shared {
	pub(crate) fn push(&self, action: QueuedAction) -> Result<(), EnqueueError> {
		let mut state = self.state.lock();
		if state.closed {
			drop(state);
			drop(action);
			return Err(EnqueueError::Closed);
		}
		state.pending.push_back(action);
		Ok(())
	}

	/// Takes the whole current batch, leaving the queue empty.
	pub(crate) fn take_all(&self) -> VecDeque<QueuedAction> {
		let mut state = self.state.lock();
		if state.pending.is_empty() {
			VecDeque::new()
		} else {
			// Hand the next batch a buffer of similar size.
			let capacity = state.pending.len();
			std::mem::replace(&mut state.pending, VecDeque::with_capacity(capacity))
		}
	}

	/// Puts `remainder` back at the front, ahead of anything enqueued since it was taken, in its original order.
	pub(crate) fn requeue_front(&self, remainder: VecDeque<QueuedAction>) {
		let mut state = self.state.lock();
		if state.closed {
			drop(state);
			drop(remainder);
			return;
		}
		let newer = std::mem::replace(&mut state.pending, remainder);
		state.pending.extend(newer);
	}

	/// Rejects further enqueues and returns whatever was still pending.
	pub(crate) fn close(&self) -> VecDeque<QueuedAction> {
		let mut state = self.state.lock();
		state.closed = true;
		std::mem::take(&mut state.pending)
	}

	pub(crate) fn is_closed(&self) -> bool {
		self.state.lock().closed
	}

	pub(crate) fn len(&self) -> usize {
		self.state.lock().pending.len()
	}
}
