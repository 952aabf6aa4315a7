//! Managed units for testing.
//!
//! Available behind the `test-utils` feature flag. Each unit proves one
//! behavior of the dispatch path: echoing input, counting calls, failing.

mod counting_unit;
mod echo_unit;
mod failing_unit;

pub use counting_unit::CountingUnit;
pub use echo_unit::EchoUnit;
pub use failing_unit::FailingUnit;
