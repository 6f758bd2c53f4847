//! E2E test harness for AmberDay libraries.
//!
//! Not every builder and assertion is used by the current scenarios.

#![allow(dead_code)]

pub mod clock;
pub mod scenario;
pub mod steps;

pub use assertions::Assertion;
pub use scenario::Scenario;
