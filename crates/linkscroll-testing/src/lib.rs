//! Testing utilities and harness for linked nested scrolling

pub mod recording;
pub mod rule;

pub use recording::RecordingRegion;
pub use rule::{drag, CountingScheduler, ScrollTestRule};

pub mod prelude {
    pub use crate::recording::*;
    pub use crate::rule::*;
}
