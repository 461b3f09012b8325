//! Core runtime for linked nested scrolling: geometry, the platform
//! scheduling hook, and the single-threaded executor that runs scroll tasks.

pub mod geometry;
pub mod platform;
mod runtime;

pub use geometry::Offset;
pub use platform::{DefaultScheduler, RuntimeScheduler};
pub use runtime::{Runtime, RuntimeHandle, TaskHandle};

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod runtime_tests;
