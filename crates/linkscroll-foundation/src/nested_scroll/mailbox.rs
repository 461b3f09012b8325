//! Bounded single-consumer mailbox for coalesced forwarding.
//!
//! Each entry is one gesture sample. The pre-phase delta opens the entry and
//! the post-phase residual of the same sample is added to it, so coalescing
//! only ever drops whole samples.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// What the consumer receives per wake-up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Coalesced {
    /// Newest sample offered since the previous receive.
    pub(crate) latest: f32,
    /// Samples dropped in favour of `latest`, including buffer overwrites.
    pub(crate) discarded: usize,
}

#[derive(Clone, Copy, Debug)]
struct PendingSample {
    delta: f32,
    awaiting_residual: bool,
}

struct MailboxState {
    pending: VecDeque<PendingSample>,
    overwritten: usize,
    waker: Option<Waker>,
    closed: bool,
}

pub(crate) struct ForwardingMailbox {
    capacity: usize,
    state: RefCell<MailboxState>,
}

impl ForwardingMailbox {
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "mailbox capacity validated by the config");
        Self {
            capacity,
            state: RefCell::new(MailboxState {
                pending: VecDeque::with_capacity(capacity),
                overwritten: 0,
                waker: None,
                closed: false,
            }),
        }
    }

    /// Queues a new sample and wakes the consumer. With `awaits_residual`, the
    /// next [`offer_residual`](Self::offer_residual) is added to this sample.
    /// Returns `false` once closed.
    pub(crate) fn offer(&self, delta: f32, awaits_residual: bool) -> bool {
        self.push(PendingSample {
            delta,
            awaiting_residual: awaits_residual,
        })
    }

    /// Adds a post-phase residual to the sample still waiting for it, or
    /// queues it as a sample of its own.
    pub(crate) fn offer_residual(&self, delta: f32) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.closed {
                return false;
            }
            if let Some(open) = state
                .pending
                .back_mut()
                .filter(|sample| sample.awaiting_residual)
            {
                open.delta += delta;
                open.awaiting_residual = false;
                return true;
            }
        }
        self.push(PendingSample {
            delta,
            awaiting_residual: false,
        })
    }

    fn push(&self, sample: PendingSample) -> bool {
        let waker = {
            let mut state = self.state.borrow_mut();
            if state.closed {
                return false;
            }
            if let Some(previous) = state.pending.back_mut() {
                previous.awaiting_residual = false;
            }
            if state.pending.len() == self.capacity {
                state.pending.pop_front();
                state.overwritten += 1;
            }
            state.pending.push_back(sample);
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub(crate) fn close(&self) {
        let waker = {
            let mut state = self.state.borrow_mut();
            state.closed = true;
            state.pending.clear();
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Resolves with the newest pending delta, or `None` after `close`.
    pub(crate) fn recv(self: &Rc<Self>) -> Recv {
        Recv {
            mailbox: Rc::clone(self),
        }
    }

    fn take_latest(&self) -> Option<Coalesced> {
        let mut state = self.state.borrow_mut();
        let latest = state.pending.pop_back()?.delta;
        let discarded = state.pending.len() + std::mem::take(&mut state.overwritten);
        state.pending.clear();
        Some(Coalesced { latest, discarded })
    }
}

pub(crate) struct Recv {
    mailbox: Rc<ForwardingMailbox>,
}

impl Future for Recv {
    type Output = Option<Coalesced>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(coalesced) = self.mailbox.take_latest() {
            return Poll::Ready(Some(coalesced));
        }
        let mut state = self.mailbox.state.borrow_mut();
        if state.closed {
            return Poll::Ready(None);
        }
        state.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}
