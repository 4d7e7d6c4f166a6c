use std::{
	error::Error,
	io,
	path::{Path, PathBuf},
	sync::Arc,
	thread,
};

use ferry::Enqueuer;

/// Starts an external evaluator and hands it the [`Enqueuer`] it marshals work back through.
///
/// Implemented for plain closures, so hosts with their own process or thread management
/// don't need a wrapper type.
pub trait RuntimeLauncher {
	/// Starts the evaluator.
	///
	/// `host_path` is the running host binary's location. It's opaque startup configuration for the evaluator.
	///
	/// # Errors
	///
	/// Iff the evaluator could not be started.
	fn launch(&self, enqueuer: Enqueuer, host_path: &Path) -> Result<(), LaunchError>;
}

impl<F> RuntimeLauncher for F
where
	F: Fn(Enqueuer, &Path) -> Result<(), LaunchError>,
{
	fn launch(&self, enqueuer: Enqueuer, host_path: &Path) -> Result<(), LaunchError> {
		self(enqueuer, host_path)
	}
}

/// Reasons an evaluator couldn't be launched.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LaunchError {
	/// The running executable's path couldn't be determined.
	#[error("could not determine the host executable's path")]
	HostPath(#[source] io::Error),
	/// The OS refused to start the evaluator thread.
	#[error("could not spawn the evaluator thread")]
	Spawn(#[source] io::Error),
	/// A custom [`RuntimeLauncher`] failed.
	#[error("the evaluator failed to start")]
	Other(#[from] Box<dyn 'static + Error + Send + Sync>),
}

/// The running executable's path, as handed to [`RuntimeLauncher::launch`].
///
/// # Errors
///
/// [`LaunchError::HostPath`] iff the OS can't report it.
pub fn host_path() -> Result<PathBuf, LaunchError> {
	std::env::current_exe().map_err(LaunchError::HostPath)
}

/// A [`RuntimeLauncher`] that runs an in-process evaluator on a fresh, named background thread per launch.
///
/// The thread is detached. Whatever it enqueues runs whenever the owner thread next drains.
pub struct ThreadLauncher {
	name: String,
	evaluator: Arc<dyn 'static + Send + Sync + Fn(Enqueuer, PathBuf)>,
}

impl ThreadLauncher {
	/// Creates a [`ThreadLauncher`] whose threads are called `ferry-evaluator`.
	pub fn new(evaluator: impl 'static + Send + Sync + Fn(Enqueuer, PathBuf)) -> Self {
		Self::named("ferry-evaluator", evaluator)
	}

	/// Creates a [`ThreadLauncher`] whose threads are called `name`.
	pub fn named(
		name: impl Into<String>,
		evaluator: impl 'static + Send + Sync + Fn(Enqueuer, PathBuf),
	) -> Self {
		Self {
			name: name.into(),
			evaluator: Arc::new(evaluator),
		}
	}

	/// The name given to evaluator threads.
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}
}

impl std::fmt::Debug for ThreadLauncher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ThreadLauncher")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

impl RuntimeLauncher for ThreadLauncher {
	fn launch(&self, enqueuer: Enqueuer, host_path: &Path) -> Result<(), LaunchError> {
		let evaluator = Arc::clone(&self.evaluator);
		let host_path = host_path.to_owned();
		thread::Builder::new()
			.name(self.name.clone())
			.spawn(move || evaluator(enqueuer, host_path))
			.map_err(LaunchError::Spawn)?;
		tracing::debug!(thread = %self.name, "launched evaluator thread");
		Ok(())
	}
}
