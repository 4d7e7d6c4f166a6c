use core::{
	any::{type_name, Any},
	fmt::{self, Debug, Formatter},
};

/// One deferred unit of work: a callback bound to the argument it was enqueued with.
///
/// The argument is moved into the closure as-is and handed back to the callback unchanged,
/// so "absent" arguments (`None`, `()`) reach it exactly as they were supplied.
pub(crate) struct QueuedAction {
	label: &'static str,
	run: Box<dyn 'static + Send + FnOnce()>,
}

impl QueuedAction {
	pub(crate) fn new<A, F>(callback: F, argument: A) -> Self
	where
		A: 'static + Send,
		F: 'static + Send + FnOnce(A),
	{
		Self {
			label: type_name::<F>(),
			run: Box::new(move || callback(argument)),
		}
	}

	/// The callback's type name, for diagnostics only.
	pub(crate) fn label(&self) -> &'static str {
		self.label
	}

	pub(crate) fn run(self) {
		(self.run)();
	}
}

impl Debug for QueuedAction {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("QueuedAction")
			.field("label", &self.label)
			.finish_non_exhaustive()
	}
}

/// Best-effort text of a panic payload caught with [`catch_unwind`](`std::panic::catch_unwind`).
///
/// `&str` and [`String`] payloads are returned as-is. Anything else becomes `"<non-string panic payload>"`.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(message) = payload.downcast_ref::<&'static str>() {
		*message
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.as_str()
	} else {
		"<non-string panic payload>"
	}
}
