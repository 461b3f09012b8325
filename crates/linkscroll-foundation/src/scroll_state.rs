//! Plain scroll position holder.
//!
//! `ScrollState` keeps a single offset clamped to `[0, max_value]` and applies
//! every delta synchronously. The inner grid of the linked-scroll screen uses
//! it as the gesture target; it also works as an immediate-mode outer region.

use crate::scrollable::{ScrollFuture, ScrollableRegion, ScrollableState};
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SCROLL_STATE_ID: AtomicU64 = AtomicU64::new(1);

/// State object for scroll position tracking.
pub struct ScrollState {
    /// Unique ID for debugging
    id: u64,
    /// Current scroll offset in pixels.
    value: Cell<f32>,
    /// Maximum scroll value (content_size - viewport_size)
    max_value: Cell<f32>,
    disposed: Cell<bool>,
}

impl ScrollState {
    /// Creates a new ScrollState with the given initial position and bound.
    pub fn new(initial: f32, max_value: f32) -> Self {
        let max_value = max_value.max(0.0);
        Self {
            id: NEXT_SCROLL_STATE_ID.fetch_add(1, Ordering::Relaxed),
            value: Cell::new(initial.clamp(0.0, max_value)),
            max_value: Cell::new(max_value),
            disposed: Cell::new(false),
        }
    }

    /// Get the unique ID of this ScrollState
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn value(&self) -> f32 {
        self.value.get()
    }

    pub fn max_value(&self) -> f32 {
        self.max_value.get()
    }

    /// Updates the bound, pulling the current value back inside it.
    pub fn set_max_value(&self, max: f32) {
        let max = max.max(0.0);
        self.max_value.set(max);
        if self.value.get() > max {
            self.value.set(max);
        }
    }

    pub fn can_scroll_forward(&self) -> bool {
        self.value.get() < self.max_value.get()
    }

    pub fn can_scroll_backward(&self) -> bool {
        self.value.get() > 0.0
    }

    /// Scrolls by the given delta, clamping to valid range [0, max_value].
    /// Returns the actual amount scrolled.
    pub fn dispatch_raw_delta(&self, delta: f32) -> f32 {
        if self.disposed.get() || !delta.is_finite() {
            return 0.0;
        }
        let current = self.value.get();
        let new_value = (current + delta).clamp(0.0, self.max_value.get());
        let actual_delta = new_value - current;
        if actual_delta != 0.0 {
            self.value.set(new_value);
            log::trace!(
                "ScrollState#{} scrolled by {actual_delta} to {new_value}",
                self.id
            );
        }
        actual_delta
    }

    /// Scrolls to the given position immediately.
    pub fn scroll_to(&self, position: f32) {
        if self.disposed.get() {
            return;
        }
        self.value.set(position.clamp(0.0, self.max_value.get()));
    }

    /// Tears the region down. Later deltas are ignored and report zero.
    pub fn dispose(&self) {
        self.disposed.set(true);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl std::fmt::Debug for ScrollState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollState")
            .field("id", &self.id)
            .field("value", &self.value.get())
            .field("max_value", &self.max_value.get())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}

impl ScrollableState for ScrollState {
    fn consume_scroll_delta(&self, delta: f32) -> f32 {
        self.dispatch_raw_delta(delta)
    }

    // Deltas apply synchronously, so nothing is ever left in flight.
    fn is_scroll_in_progress(&self) -> bool {
        false
    }
}

impl ScrollableRegion for ScrollState {
    fn scroll_by(&self, delta: f32) -> ScrollFuture {
        let applied = self.dispatch_raw_delta(delta);
        Box::pin(std::future::ready(applied))
    }

    fn scroll_offset(&self) -> f32 {
        self.value.get()
    }

    fn is_scroll_in_progress(&self) -> bool {
        false
    }
}
