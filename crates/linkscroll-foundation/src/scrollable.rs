//! Scroll contracts implemented by scroll regions.
//!
//! A region is driven two ways. The nested-scroll dispatcher feeds gesture
//! samples to the region under the pointer through [`ScrollableState`], which
//! answers synchronously with what it consumed. Other parties (the forwarding
//! connection) request programmatic scrolls through [`ScrollableRegion`], which
//! may suspend until the region applies the request.

use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};

/// Future returned by [`ScrollableRegion::scroll_by`], resolving to the amount
/// the region actually applied.
pub type ScrollFuture = Pin<Box<dyn Future<Output = f32>>>;

/// Low-level scrollable state interface.
///
/// Implemented by scroll state holders to consume deltas coming from gesture
/// input. Deltas are in scroll-offset space: positive grows the offset.
pub trait ScrollableState {
    /// Consume a scroll delta and return the amount consumed.
    ///
    /// The result may be smaller than `delta` when the region hits a bound,
    /// which is what leaves a residual for the post-scroll phase.
    fn consume_scroll_delta(&self, delta: f32) -> f32;

    /// Whether this scrollable state is currently scrolling.
    fn is_scroll_in_progress(&self) -> bool;
}

/// A region that accepts asynchronous "scroll by" requests.
///
/// Implementations must tolerate several requests in flight at once and must
/// not panic once torn down: requests against a disposed region resolve to
/// `0.0`.
pub trait ScrollableRegion {
    /// Requests a scroll by `delta` pixels in scroll-offset space.
    fn scroll_by(&self, delta: f32) -> ScrollFuture;

    /// Current absolute scroll offset in pixels.
    fn scroll_offset(&self) -> f32;

    /// Whether any scroll request is still waiting to be applied.
    fn is_scroll_in_progress(&self) -> bool;
}

/// Shared handle to a region that can be linked without being owned.
///
/// Implemented for `Rc<R>` of any concrete region and for an already erased
/// `Rc<dyn ScrollableRegion>`.
pub trait SharedRegion {
    fn downgrade_region(&self) -> Weak<dyn ScrollableRegion>;
}

impl<R: ScrollableRegion + 'static> SharedRegion for Rc<R> {
    fn downgrade_region(&self) -> Weak<dyn ScrollableRegion> {
        let weak: Weak<R> = Rc::downgrade(self);
        weak
    }
}

impl SharedRegion for Rc<dyn ScrollableRegion> {
    fn downgrade_region(&self) -> Weak<dyn ScrollableRegion> {
        Rc::downgrade(self)
    }
}
