//! Lazy list state management.
//!
//! Provides [`LazyListState`], the outer vertical list of the linked-scroll
//! screen. Scroll requests are not applied when issued: they accumulate in
//! `scroll_to_be_consumed` and the next [`LazyListState::measure`] pass clamps
//! and applies them, then resumes every suspended `scroll_by` future.

use crate::scrollable::{ScrollFuture, ScrollableRegion};
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Contains the current scroll position represented by the first visible item
/// index and the first visible item scroll offset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LazyListScrollPosition {
    pub index: usize,
    pub scroll_offset: f32,
}

/// Result of one measure pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LazyListMeasureResult {
    /// Pending delta that was requested before clamping.
    pub requested: f32,
    /// Delta actually applied to the offset.
    pub consumed: f32,
    /// Number of suspended `scroll_by` calls resumed by this pass.
    pub resumed: usize,
}

#[derive(Default)]
struct ScrollRequestSlot {
    requested: f32,
    applied: Option<f32>,
    waker: Option<Waker>,
}

/// Non-reactive internal state for LazyListState.
struct LazyListStateInner {
    /// Main-axis extent of each item, in order.
    item_extents: Vec<f32>,
    viewport_extent: f32,
    /// Absolute scroll offset from the top of the first item.
    scroll_offset: f32,
    /// Sum of scroll requests not yet applied by a measure pass.
    scroll_to_be_consumed: f32,
    waiting: Vec<Rc<RefCell<ScrollRequestSlot>>>,
    disposed: bool,
}

impl LazyListStateInner {
    fn content_extent(&self) -> f32 {
        self.item_extents.iter().sum()
    }

    fn max_scroll_offset(&self) -> f32 {
        (self.content_extent() - self.viewport_extent).max(0.0)
    }

    fn clamp_scroll_offset(&mut self) {
        self.scroll_offset = self.scroll_offset.clamp(0.0, self.max_scroll_offset());
    }
}

/// State object for the outer list's scroll position.
///
/// # Example
///
/// ```rust
/// use linkscroll_foundation::{LazyListState, ScrollableRegion};
///
/// let state = LazyListState::new(vec![200.0, 800.0], 600.0);
/// let _request = state.scroll_by(150.0);
/// state.measure();
/// assert_eq!(state.first_visible_item_index(), 0);
/// assert_eq!(state.scroll_offset(), 150.0);
/// ```
pub struct LazyListState {
    inner: RefCell<LazyListStateInner>,
}

impl LazyListState {
    pub fn new(item_extents: Vec<f32>, viewport_extent: f32) -> Self {
        Self {
            inner: RefCell::new(LazyListStateInner {
                item_extents,
                viewport_extent: viewport_extent.max(0.0),
                scroll_offset: 0.0,
                scroll_to_be_consumed: 0.0,
                waiting: Vec::new(),
                disposed: false,
            }),
        }
    }

    pub fn item_count(&self) -> usize {
        self.inner.borrow().item_extents.len()
    }

    /// Replaces the item extents, pulling the offset back in range if the
    /// content shrank.
    pub fn set_item_extents(&self, item_extents: Vec<f32>) {
        let mut inner = self.inner.borrow_mut();
        inner.item_extents = item_extents;
        inner.clamp_scroll_offset();
    }

    pub fn set_viewport_extent(&self, viewport_extent: f32) {
        let mut inner = self.inner.borrow_mut();
        inner.viewport_extent = viewport_extent.max(0.0);
        inner.clamp_scroll_offset();
    }

    pub fn max_scroll_offset(&self) -> f32 {
        self.inner.borrow().max_scroll_offset()
    }

    /// Peeks at the pending scroll delta without consuming it.
    pub fn peek_scroll_delta(&self) -> f32 {
        self.inner.borrow().scroll_to_be_consumed
    }

    pub fn scroll_position(&self) -> LazyListScrollPosition {
        let inner = self.inner.borrow();
        let mut start = 0.0;
        for (index, extent) in inner.item_extents.iter().enumerate() {
            let end = start + extent;
            if end > inner.scroll_offset {
                return LazyListScrollPosition {
                    index,
                    scroll_offset: inner.scroll_offset - start,
                };
            }
            start = end;
        }
        LazyListScrollPosition {
            index: inner.item_extents.len().saturating_sub(1),
            scroll_offset: 0.0,
        }
    }

    pub fn first_visible_item_index(&self) -> usize {
        self.scroll_position().index
    }

    pub fn first_visible_item_scroll_offset(&self) -> f32 {
        self.scroll_position().scroll_offset
    }

    pub fn can_scroll_forward(&self) -> bool {
        let inner = self.inner.borrow();
        inner.scroll_offset < inner.max_scroll_offset()
    }

    pub fn can_scroll_backward(&self) -> bool {
        self.inner.borrow().scroll_offset > 0.0
    }

    /// Applies pending scroll and resumes waiting `scroll_by` futures.
    ///
    /// Requests are summed before clamping, not applied one by one: at the
    /// end of the list, `+100` followed by `-99` nets `+1` and leaves the
    /// offset where it was, where sequential application would end 99 short
    /// of the end.
    ///
    /// When clamping cuts the pending delta short, every waiter receives the
    /// same fraction of its own request.
    pub fn measure(&self) -> LazyListMeasureResult {
        let (result, waiting) = {
            let mut inner = self.inner.borrow_mut();
            let requested = std::mem::take(&mut inner.scroll_to_be_consumed);
            let max = inner.max_scroll_offset();
            let target = (inner.scroll_offset + requested).clamp(0.0, max);
            let consumed = target - inner.scroll_offset;
            inner.scroll_offset = target;
            let ratio = if requested != 0.0 {
                consumed / requested
            } else {
                1.0
            };
            let waiting = std::mem::take(&mut inner.waiting);
            for slot in &waiting {
                let mut slot = slot.borrow_mut();
                slot.applied = Some(slot.requested * ratio);
            }
            let result = LazyListMeasureResult {
                requested,
                consumed,
                resumed: waiting.len(),
            };
            (result, waiting)
        };
        if result.requested != 0.0 {
            log::trace!(
                "LazyListState measured: requested {} consumed {} resumed {}",
                result.requested,
                result.consumed,
                result.resumed
            );
        }
        // Wake outside the borrow; a waker may poll straight back into us.
        for slot in waiting {
            let waker = slot.borrow_mut().waker.take();
            if let Some(waker) = waker {
                waker.wake();
            }
        }
        result
    }

    /// Tears the list down. Suspended and future requests resolve to zero.
    pub fn dispose(&self) {
        let waiting = {
            let mut inner = self.inner.borrow_mut();
            inner.disposed = true;
            inner.scroll_to_be_consumed = 0.0;
            std::mem::take(&mut inner.waiting)
        };
        for slot in waiting {
            let waker = {
                let mut slot = slot.borrow_mut();
                slot.applied = Some(0.0);
                slot.waker.take()
            };
            if let Some(waker) = waker {
                waker.wake();
            }
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }
}

impl std::fmt::Debug for LazyListState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LazyListState")
            .field("item_count", &inner.item_extents.len())
            .field("scroll_offset", &inner.scroll_offset)
            .field("scroll_to_be_consumed", &inner.scroll_to_be_consumed)
            .field("waiting", &inner.waiting.len())
            .field("disposed", &inner.disposed)
            .finish()
    }
}

impl ScrollableRegion for LazyListState {
    fn scroll_by(&self, delta: f32) -> ScrollFuture {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed || !delta.is_finite() {
            return Box::pin(std::future::ready(0.0));
        }
        inner.scroll_to_be_consumed += delta;
        let slot = Rc::new(RefCell::new(ScrollRequestSlot {
            requested: delta,
            ..ScrollRequestSlot::default()
        }));
        inner.waiting.push(Rc::clone(&slot));
        Box::pin(PendingScroll { slot })
    }

    fn scroll_offset(&self) -> f32 {
        self.inner.borrow().scroll_offset
    }

    fn is_scroll_in_progress(&self) -> bool {
        !self.inner.borrow().waiting.is_empty()
    }
}

struct PendingScroll {
    slot: Rc<RefCell<ScrollRequestSlot>>,
}

impl Future for PendingScroll {
    type Output = f32;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<f32> {
        let mut slot = self.slot.borrow_mut();
        match slot.applied {
            Some(applied) => Poll::Ready(applied),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}
