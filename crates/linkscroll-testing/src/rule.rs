use linkscroll_core::{Offset, Runtime, RuntimeHandle, RuntimeScheduler};
use linkscroll_foundation::{
    LazyListState, NestedScrollDispatcher, NestedScrollResult, NestedScrollSource,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Scheduler that counts frame requests instead of driving a real host.
#[derive(Debug, Default)]
pub struct CountingScheduler {
    frames: AtomicUsize,
}

impl CountingScheduler {
    pub fn frames_requested(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

impl RuntimeScheduler for CountingScheduler {
    fn schedule_frame(&self) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }
}

/// Owns a runtime for a test and drives it like a host surface would.
pub struct ScrollTestRule {
    scheduler: Arc<CountingScheduler>,
    runtime: Runtime,
}

impl ScrollTestRule {
    pub fn new() -> Self {
        let scheduler = Arc::new(CountingScheduler::default());
        let runtime = Runtime::new(scheduler.clone());
        Self { scheduler, runtime }
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn frames_requested(&self) -> usize {
        self.scheduler.frames_requested()
    }

    pub fn pending_tasks(&self) -> usize {
        self.runtime.pending_task_count()
    }

    pub fn drain(&self) {
        self.runtime.drain_ui();
    }

    /// Alternates task draining with measure passes of `list` until neither
    /// has anything left to do. Returns the number of passes that moved it.
    pub fn run_frames(&self, list: &LazyListState) -> usize {
        let mut moved = 0;
        loop {
            self.runtime.drain_ui();
            let measured = list.measure();
            if measured.consumed != 0.0 {
                moved += 1;
            }
            if measured.resumed == 0 {
                break;
            }
        }
        self.runtime.drain_ui();
        moved
    }
}

impl Default for ScrollTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Feeds a vertical drag of `total` pixels to `dispatcher` as `steps` equal
/// samples, returning each sample's result.
pub fn drag(dispatcher: &NestedScrollDispatcher, total: f32, steps: usize) -> Vec<NestedScrollResult> {
    if steps == 0 {
        return Vec::new();
    }
    let sample = Offset::vertical(total / steps as f32);
    (0..steps)
        .map(|_| dispatcher.dispatch_scroll(sample, NestedScrollSource::UserInput))
        .collect()
}
