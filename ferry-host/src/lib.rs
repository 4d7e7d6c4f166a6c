#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]
//!
//! # Threading Notes
//!
//! [`TickSource`] and the [`Dispatcher`](`ferry::Dispatcher`) it drains both live on the owner thread.
//! Only the [`Enqueuer`](`ferry::Enqueuer`) handed to a [`RuntimeLauncher`] crosses over.

mod integration;
mod launcher;
mod tick;

pub use integration::{initialize, register_drain, DRAIN_KEY};
pub use launcher::{host_path, LaunchError, RuntimeLauncher, ThreadLauncher};
pub use tick::{HandlerKey, TickSource};

#[doc = include_str!("../README.md")]
mod readme {}
