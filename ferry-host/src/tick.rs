use core::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
};
use std::{
	panic::{catch_unwind, AssertUnwindSafe},
	rc::Rc,
};

use scopeguard::guard;

/// Names a [`TickSource`] subscription. At most one handler is subscribed per key.
pub type HandlerKey = &'static str;

type Handler = Rc<RefCell<dyn FnMut()>>;

/// A periodic hook that runs its handlers each time the host calls [`.tick()`](`TickSource::tick`),
/// for example once per frame.
///
/// # Logic
///
/// Subscriptions are keyed, and [`.subscribe`](`TickSource::subscribe`) always removes an existing handler
/// with the same key first. Registering the same work twice therefore can't make it run twice per tick.
///
/// # Threading
///
/// Not [`Send`]. Handlers run on the thread that owns the [`TickSource`], and needn't be [`Send`] either.
#[derive(Default)]
pub struct TickSource {
	handlers: RefCell<Vec<(HandlerKey, Handler)>>,
	ticking: Cell<bool>,
}

impl Debug for TickSource {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("TickSource")
			.field(
				"handlers",
				&self.handlers.borrow().iter().map(|(key, _)| key).collect::<Vec<_>>(),
			)
			.field("ticking", &self.ticking.get())
			.finish()
	}
}

impl TickSource {
	/// Creates a [`TickSource`] without handlers.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Deregisters any handler subscribed as `key`, then subscribes `handler` as `key`.
	///
	/// The new handler goes last in tick order.
	///
	/// **Returns** whether an earlier handler was replaced.
	pub fn subscribe(&self, key: HandlerKey, handler: impl 'static + FnMut()) -> bool {
		let replaced = self.remove(key);
		let was_subscribed = replaced.is_some();
		let handler: Handler = Rc::new(RefCell::new(handler));
		self.handlers.borrow_mut().push((key, handler));
		tracing::debug!(key, replaced = was_subscribed, "subscribed tick handler");

		// Dropped only after the handler list is released again.
		drop(replaced);
		was_subscribed
	}

	/// Deregisters the handler subscribed as `key`, if any.
	///
	/// **Idempotent** aside from the return value.
	/// **Returns** whether a handler was removed.
	pub fn unsubscribe(&self, key: HandlerKey) -> bool {
		let removed = self.remove(key);
		if removed.is_some() {
			tracing::debug!(key, "unsubscribed tick handler");
		}
		removed.is_some()
	}

	fn remove(&self, key: HandlerKey) -> Option<Handler> {
		let mut handlers = self.handlers.borrow_mut();
		let index = handlers.iter().position(|&(k, _)| k == key)?;
		Some(handlers.remove(index).1)
	}

	/// Whether a handler is currently subscribed as `key`.
	#[must_use]
	pub fn is_subscribed(&self, key: HandlerKey) -> bool {
		self.handlers.borrow().iter().any(|&(k, _)| k == key)
	}

	/// Number of subscribed handlers.
	#[must_use]
	pub fn len(&self) -> usize {
		self.handlers.borrow().len()
	}

	/// Whether no handlers are subscribed.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Runs each handler that is subscribed when this call starts, once, in subscription order.
	///
	/// Handlers may subscribe and unsubscribe freely. Such changes apply from the next tick on.
	/// A panicking handler is logged and skipped. Nested calls from within a handler do nothing.
	///
	/// **Returns** the number of handlers that returned normally.
	pub fn tick(&self) -> usize {
		if self.ticking.replace(true) {
			tracing::warn!("ignored re-entrant `tick` from inside a tick handler");
			return 0;
		}
		let _ticking = guard(&self.ticking, |ticking| ticking.set(false));

		let snapshot = self
			.handlers
			.borrow()
			.iter()
			.map(|(key, handler)| (*key, Rc::clone(handler)))
			.collect::<Vec<_>>();

		let mut ran = 0;
		for (key, handler) in snapshot {
			let mut handler = handler.borrow_mut();
			match catch_unwind(AssertUnwindSafe(|| (&mut *handler)())) {
				Ok(()) => ran += 1,
				Err(payload) => {
					tracing::error!(
						key,
						panic = ferry::panic_message(&*payload),
						"tick handler panicked"
					);
				}
			}
		}
		ran
	}
}
