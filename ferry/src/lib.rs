#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]
//!
//! # Threading Notes
//!
//! [`Dispatcher`] is neither [`Send`] nor [`Sync`]. The thread that constructs it is its owner thread,
//! and it's the only thread that can ever [`drain`](`Dispatcher::drain`) it.
//! Hand [`Enqueuer`]s to everything else.

mod action;
mod dispatcher;
mod enqueuer;
mod queue;

pub use dispatcher::{Dispatcher, DrainReport, PanicPolicy};
pub use enqueuer::{EnqueueError, Enqueuer};

#[doc(hidden)]
pub use action::panic_message;

#[doc = include_str!("../README.md")]
mod readme {}
