//! Platform abstraction for runtime scheduling.
//!
//! The host surface (a window, a test harness, a headless demo) decides when
//! the runtime gets drained. The runtime only tells it that work is pending.

/// Receives "work is pending" notifications from the runtime.
///
/// Wakers created by the runtime hold an `Arc` to the scheduler, so
/// implementations must be safe to use from multiple threads.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host drain the runtime on its next frame.
    fn schedule_frame(&self);
}

/// Scheduler that ignores frame requests. Hosts that drain the runtime in a
/// loop of their own don't need the notification.
#[derive(Debug, Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}
