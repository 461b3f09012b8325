//! Foundation for linked nested scrolling: scroll states, the nested-scroll
//! dispatcher, and the connection that forwards scroll to an outer region.

pub mod lazy;
pub mod nested_scroll;
pub mod scroll_state;
pub mod scrollable;

pub use lazy::{LazyListMeasureResult, LazyListScrollPosition, LazyListState};
pub use nested_scroll::*;
pub use scroll_state::ScrollState;
pub use scrollable::{ScrollFuture, ScrollableRegion, ScrollableState, SharedRegion};

pub mod prelude {
    pub use crate::lazy::*;
    pub use crate::nested_scroll::*;
    pub use crate::scroll_state::*;
    pub use crate::scrollable::*;
    pub use linkscroll_core::Offset;
}

#[cfg(test)]
#[path = "tests/forwarding_tests.rs"]
mod forwarding_tests;

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod dispatcher_tests;

#[cfg(test)]
#[path = "tests/scroll_state_tests.rs"]
mod scroll_state_tests;
