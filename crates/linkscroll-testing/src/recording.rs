//! Outer-region double that records every `scroll_by` request.

use linkscroll_foundation::{ScrollFuture, ScrollableRegion};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

#[derive(Default)]
struct Gate {
    closed: Cell<bool>,
    in_flight: Cell<usize>,
    wakers: RefCell<Vec<Waker>>,
}

/// Region that applies requests to an unbounded offset and remembers them.
///
/// A closed gate keeps every returned future pending, which lets tests observe
/// how many forwarding tasks are alive at once.
#[derive(Default)]
pub struct RecordingRegion {
    requests: RefCell<Vec<f32>>,
    offset: Cell<f32>,
    gate: Rc<Gate>,
}

impl RecordingRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Region whose requests stay pending until [`RecordingRegion::open_gate`].
    pub fn gated() -> Self {
        let region = Self::default();
        region.gate.closed.set(true);
        region
    }

    pub fn open_gate(&self) {
        self.gate.closed.set(false);
        let wakers = std::mem::take(&mut *self.gate.wakers.borrow_mut());
        for waker in wakers {
            waker.wake();
        }
    }

    /// Every requested delta, in request order.
    pub fn requests(&self) -> Vec<f32> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    /// Requests whose futures have not resolved yet.
    pub fn in_flight(&self) -> usize {
        self.gate.in_flight.get()
    }
}

impl ScrollableRegion for RecordingRegion {
    fn scroll_by(&self, delta: f32) -> ScrollFuture {
        log::trace!("RecordingRegion received scroll_by({delta})");
        self.requests.borrow_mut().push(delta);
        self.offset.set(self.offset.get() + delta);
        self.gate.in_flight.set(self.gate.in_flight.get() + 1);
        Box::pin(RecordedScroll {
            gate: Rc::clone(&self.gate),
            delta,
            done: false,
        })
    }

    fn scroll_offset(&self) -> f32 {
        self.offset.get()
    }

    fn is_scroll_in_progress(&self) -> bool {
        self.gate.in_flight.get() > 0
    }
}

struct RecordedScroll {
    gate: Rc<Gate>,
    delta: f32,
    done: bool,
}

impl RecordedScroll {
    fn finish(&mut self) {
        if !self.done {
            self.done = true;
            self.gate.in_flight.set(self.gate.in_flight.get() - 1);
        }
    }
}

impl Future for RecordedScroll {
    type Output = f32;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<f32> {
        if self.gate.closed.get() {
            self.gate.wakers.borrow_mut().push(cx.waker().clone());
            return Poll::Pending;
        }
        self.finish();
        Poll::Ready(self.delta)
    }
}

impl Drop for RecordedScroll {
    fn drop(&mut self) {
        self.finish();
    }
}
