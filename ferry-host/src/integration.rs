use std::rc::Rc;

use ferry::Dispatcher;

use crate::{
	launcher::{host_path, LaunchError, RuntimeLauncher},
	tick::{HandlerKey, TickSource},
};

/// The [`TickSource`] key [`register_drain`] subscribes under.
pub const DRAIN_KEY: HandlerKey = "ferry::drain";

/// Subscribes `dispatcher`'s [`drain`](`Dispatcher::drain`) to `ticks` as [`DRAIN_KEY`],
/// replacing any earlier drain subscription.
///
/// The subscription holds the [`Dispatcher`] weakly. Once it's dropped, the handler does nothing.
///
/// **Returns** whether an earlier drain subscription was replaced.
pub fn register_drain(ticks: &TickSource, dispatcher: &Rc<Dispatcher>) -> bool {
	let dispatcher = Rc::downgrade(dispatcher);
	ticks.subscribe(DRAIN_KEY, move || {
		if let Some(dispatcher) = dispatcher.upgrade() {
			let report = dispatcher.drain();
			if report.panicked > 0 {
				tracing::warn!(ran = report.ran, panicked = report.panicked, "drained with panics");
			}
		}
	})
}

/// Load-time wiring for a host: launches the evaluator, then (re)registers draining on `ticks`.
///
/// Safe to call again when the host reloads. Any previous drain subscription is removed first,
/// so queued actions still run once per tick.
///
/// # Errors
///
/// Iff the evaluator couldn't be launched. Draining is registered regardless,
/// so work from an earlier, still-running evaluator keeps flowing.
pub fn initialize(
	ticks: &TickSource,
	dispatcher: &Rc<Dispatcher>,
	launcher: &impl RuntimeLauncher,
) -> Result<(), LaunchError> {
	let launched = host_path().and_then(|host_path| {
		tracing::debug!(host_path = %host_path.display(), "launching evaluator");
		launcher.launch(dispatcher.enqueuer(), &host_path)
	});
	if let Err(error) = &launched {
		tracing::error!(%error, "failed to launch the evaluator");
	}

	let reloaded = ticks.unsubscribe(DRAIN_KEY);
	register_drain(ticks, dispatcher);
	tracing::debug!(reloaded, "registered drain");

	launched
}
