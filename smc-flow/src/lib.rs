#![deny(missing_docs)]
//! Flow and configuration control for the SMC module host emulator.
//!
//! A module re-invokes the units it manages through the
//! [`FlowController`], either one at a time ([`FlowController::execute_now`])
//! or as a task over several slots ([`FlowController::execute_parallel`]).
//! Every dispatch is announced on the shared output log before any unit
//! runs. Each slot buffers the latest result only.
//!
//! The [`Scheduler`] decides how a batch actually runs. The default
//! [`SequentialScheduler`] awaits each unit in turn: parallelism is
//! simulated, never real.
//!
//! The [`ConfigurationController`] keeps the roster of configurations a
//! module creates and removes at run time.

mod control;
mod flow;
mod scheduler;

pub use control::ConfigurationController;
pub use flow::{FlowController, Task};
pub use scheduler::{Batch, Scheduler, SequentialScheduler};
