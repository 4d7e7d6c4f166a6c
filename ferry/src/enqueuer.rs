use std::sync::Arc;

use crate::{action::QueuedAction, queue::Shared};

/// A [`Send`] + [`Sync`] handle that submits work to one [`Dispatcher`](`crate::Dispatcher`).
///
/// Cloning is cheap. Handles don't keep the [`Dispatcher`](`crate::Dispatcher`) alive:
/// once it drops, every enqueue through its handles fails with [`EnqueueError::Closed`].
#[derive(Debug, Clone)]
pub struct Enqueuer {
	pub(crate) shared: Arc<Shared>,
}

/// Reasons an action wasn't queued.
///
/// In either case, the callback and its argument have already been dropped without running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum EnqueueError {
	/// No callback was supplied to [`Enqueuer::try_enqueue`].
	#[error("no callback was supplied")]
	InvalidAction,
	/// The owning [`Dispatcher`](`crate::Dispatcher`) was dropped, so nothing would ever drain this action.
	#[error("the owning dispatcher has been dropped")]
	Closed,
}

impl Enqueuer {
	/// Queues `callback(argument)` to run on the owner thread during a later [`drain`](`crate::Dispatcher::drain`).
	///
	/// Returns as soon as the action is queued. `argument` is passed through untouched,
	/// so use an [`Option`] if it may legitimately be absent.
	///
	/// # Errors
	///
	/// [`EnqueueError::Closed`] iff the [`Dispatcher`](`crate::Dispatcher`) is gone.
	pub fn enqueue<A, F>(&self, callback: F, argument: A) -> Result<(), EnqueueError>
	where
		A: 'static + Send,
		F: 'static + Send + FnOnce(A),
	{
		let action = QueuedAction::new(callback, argument);
		let label = action.label();
		let result = self.shared.push(action);
		match result {
			Ok(()) => tracing::trace!(callback = label, "enqueued"),
			Err(error) => tracing::warn!(callback = label, %error, "rejected enqueue"),
		}
		result
	}

	/// Like [`.enqueue`](`Enqueuer::enqueue`), but for producers that may not have a callback to hand over
	/// (for example the far side of a scripting bridge).
	///
	/// # Errors
	///
	/// [`EnqueueError::InvalidAction`] immediately if `callback` is [`None`]. Nothing is queued in that case.
	/// [`EnqueueError::Closed`] iff the [`Dispatcher`](`crate::Dispatcher`) is gone.
	pub fn try_enqueue<A, F>(&self, callback: Option<F>, argument: A) -> Result<(), EnqueueError>
	where
		A: 'static + Send,
		F: 'static + Send + FnOnce(A),
	{
		match callback {
			Some(callback) => self.enqueue(callback, argument),
			None => {
				tracing::warn!(argument = core::any::type_name::<A>(), "rejected enqueue without a callback");
				Err(EnqueueError::InvalidAction)
			}
		}
	}

	/// Whether the [`Dispatcher`](`crate::Dispatcher`) behind this handle has been dropped.
	#[must_use]
	pub fn is_closed(&self) -> bool {
		self.shared.is_closed()
	}
}
