//! Nested-scroll input pipeline for one vertically scrolling child region.

use super::connection::{NestedScrollConnection, NestedScrollSource};
use crate::scrollable::ScrollableState;
use linkscroll_core::Offset;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

type ConnectionChain = SmallVec<[Rc<dyn NestedScrollConnection>; 2]>;

/// Breakdown of how one dispatched sample was consumed, in gesture space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NestedScrollResult {
    pub pre_consumed: Offset,
    pub child_consumed: Offset,
    pub post_consumed: Offset,
    /// What nobody claimed.
    pub unconsumed: Offset,
}

impl NestedScrollResult {
    pub fn total_consumed(&self) -> Offset {
        self.pre_consumed + self.child_consumed + self.post_consumed
    }
}

/// Runs the pre / child / post sequence for each gesture sample offered to
/// a child region.
///
/// The child only scrolls vertically: the horizontal component is never
/// consumed by it and flows through to the post phase untouched.
pub struct NestedScrollDispatcher {
    child: Rc<dyn ScrollableState>,
    connections: RefCell<ConnectionChain>,
}

impl NestedScrollDispatcher {
    pub fn new(child: Rc<dyn ScrollableState>) -> Self {
        Self {
            child,
            connections: RefCell::new(SmallVec::new()),
        }
    }

    /// Appends a connection; earlier connections are offered each phase first.
    pub fn attach(&self, connection: Rc<dyn NestedScrollConnection>) {
        self.connections.borrow_mut().push(connection);
    }

    /// Removes a previously attached connection. Returns whether it was found.
    pub fn detach(&self, connection: &Rc<dyn NestedScrollConnection>) -> bool {
        let mut connections = self.connections.borrow_mut();
        let before = connections.len();
        connections.retain(|attached| !Rc::ptr_eq(attached, connection));
        connections.len() != before
    }

    pub fn connection_count(&self) -> usize {
        self.connections.borrow().len()
    }

    pub fn dispatch_scroll(&self, delta: Offset, source: NestedScrollSource) -> NestedScrollResult {
        if !delta.is_finite() {
            log::warn!("dropping non-finite scroll sample {delta:?}");
            return NestedScrollResult {
                unconsumed: delta,
                ..NestedScrollResult::default()
            };
        }

        // Snapshot so connections may attach or detach from inside a callback.
        let connections: ConnectionChain = self.connections.borrow().clone();

        let mut available = delta;
        let mut pre_consumed = Offset::ZERO;
        for connection in &connections {
            let claimed = connection.on_pre_scroll(available, source);
            pre_consumed += claimed;
            available -= claimed;
        }

        // Gesture space and scroll-offset space run in opposite directions.
        let child_scrolled = self.child.consume_scroll_delta(-available.y);
        let child_consumed = Offset::vertical(-child_scrolled);
        available -= child_consumed;

        let mut post_consumed = Offset::ZERO;
        for connection in &connections {
            let claimed = connection.on_post_scroll(child_consumed, available, source);
            post_consumed += claimed;
            available -= claimed;
        }

        NestedScrollResult {
            pre_consumed,
            child_consumed,
            post_consumed,
            unconsumed: available,
        }
    }
}

impl std::fmt::Debug for NestedScrollDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NestedScrollDispatcher")
            .field("connections", &self.connection_count())
            .finish()
    }
}
