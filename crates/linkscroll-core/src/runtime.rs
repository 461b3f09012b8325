use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::thread::ThreadId;

use crate::platform::RuntimeScheduler;

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_frame: Cell<bool>,
    // Set by the task waker; shared with it, so it has to be thread-safe.
    woken: Arc<AtomicBool>,
    tasks: RefCell<Vec<TaskEntry>>,
    // Ids cancelled while their entry was taken out for polling.
    cancelled_in_flight: RefCell<Vec<u64>>,
    polling: Cell<bool>,
    spawned_while_polling: Cell<bool>,
    next_task_id: Cell<u64>,
    task_waker: RefCell<Option<Waker>>,
    ui_thread_id: ThreadId,
}

struct TaskEntry {
    id: u64,
    future: Pin<Box<dyn Future<Output = ()> + 'static>>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            needs_frame: Cell::new(false),
            woken: Arc::new(AtomicBool::new(false)),
            tasks: RefCell::new(Vec::new()),
            cancelled_in_flight: RefCell::new(Vec::new()),
            polling: Cell::new(false),
            spawned_while_polling: Cell::new(false),
            next_task_id: Cell::new(1),
            task_waker: RefCell::new(None),
            ui_thread_id: std::thread::current().id(),
        }
    }

    fn init_task_waker(this: &Rc<Self>) {
        let waker =
            RuntimeTaskWaker::new(this.scheduler.clone(), Arc::clone(&this.woken)).into_waker();
        *this.task_waker.borrow_mut() = Some(waker);
    }

    fn schedule(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn spawn_ui_task(&self, future: Pin<Box<dyn Future<Output = ()> + 'static>>) -> u64 {
        debug_assert_eq!(
            std::thread::current().id(),
            self.ui_thread_id,
            "UI task spawned off the runtime thread",
        );
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        self.tasks.borrow_mut().push(TaskEntry { id, future });
        if self.polling.get() {
            self.spawned_while_polling.set(true);
        }
        self.schedule();
        id
    }

    fn cancel_task(&self, id: u64) {
        let mut tasks = self.tasks.borrow_mut();
        if tasks.iter().any(|entry| entry.id == id) {
            tasks.retain(|entry| entry.id != id);
        } else if self.polling.get() {
            self.cancelled_in_flight.borrow_mut().push(id);
        }
    }

    /// Polls every task once. Returns whether another pass could make progress.
    fn poll_async_tasks(&self) -> bool {
        let waker = match self.task_waker.borrow().as_ref() {
            Some(waker) => waker.clone(),
            None => return false,
        };
        let mut cx = Context::from_waker(&waker);
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        let mut pending = Vec::with_capacity(tasks.len());
        let mut made_progress = false;
        self.polling.set(true);
        self.spawned_while_polling.set(false);
        self.woken.store(false, Ordering::SeqCst);
        for mut entry in tasks.into_iter() {
            if self.cancelled_in_flight.borrow().contains(&entry.id) {
                continue;
            }
            match entry.future.as_mut().poll(&mut cx) {
                Poll::Ready(()) => {
                    made_progress = true;
                }
                Poll::Pending => {
                    pending.push(entry);
                }
            }
        }
        self.polling.set(false);
        let cancelled = std::mem::take(&mut *self.cancelled_in_flight.borrow_mut());
        if !cancelled.is_empty() {
            pending.retain(|entry| !cancelled.contains(&entry.id));
        }
        if !pending.is_empty() {
            // Tasks spawned during the pass were pushed to the live list; keep
            // the older ones in front so spawn order is preserved.
            let mut tasks = self.tasks.borrow_mut();
            let spawned = std::mem::take(&mut *tasks);
            tasks.extend(pending);
            tasks.extend(spawned);
        }
        made_progress || self.spawned_while_polling.get() || self.woken.load(Ordering::SeqCst)
    }

    /// Tasks left after this are parked until something wakes them.
    fn drain_ui(&self) {
        while self.poll_async_tasks() {}
        self.needs_frame.set(false);
    }

    fn needs_frame(&self) -> bool {
        self.needs_frame.get() || self.woken.load(Ordering::SeqCst)
    }

    fn has_pending_ui(&self) -> bool {
        self.tasks
            .try_borrow()
            .map(|tasks| !tasks.is_empty())
            .unwrap_or(true)
    }
}

/// Single-threaded executor for UI-bound futures.
///
/// The screen hosting the scroll regions owns the runtime; everything else
/// holds a [`RuntimeHandle`]. Tasks may capture `Rc`/`RefCell` state since they
/// never leave the thread that created the runtime.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let inner = Rc::new(RuntimeInner::new(scheduler));
        RuntimeInner::init_task_waker(&inner);
        Self { inner }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether a task was spawned or woken since the last drain. Tasks parked
    /// on a future nobody has woken do not count.
    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame()
    }

    /// Polls tasks until a pass neither completes nor spawns anything.
    pub fn drain_ui(&self) {
        self.inner.drain_ui();
    }

    pub fn has_pending_ui(&self) -> bool {
        self.inner.has_pending_ui()
    }

    pub fn pending_task_count(&self) -> usize {
        self.inner.tasks.borrow().len()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("pending_tasks", &self.pending_task_count())
            .field("needs_frame", &self.needs_frame())
            .finish()
    }
}

/// Weak handle to a [`Runtime`].
///
/// Every operation is a no-op once the runtime is dropped; `spawn_ui` reports
/// that by returning `None`.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

pub struct TaskHandle {
    id: u64,
    runtime: RuntimeHandle,
}

impl RuntimeHandle {
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn schedule(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.schedule();
        }
    }

    pub fn spawn_ui<F>(&self, fut: F) -> Option<TaskHandle>
    where
        F: Future<Output = ()> + 'static,
    {
        self.inner.upgrade().map(|inner| {
            let id = inner.spawn_ui_task(Box::pin(fut));
            TaskHandle {
                id,
                runtime: self.clone(),
            }
        })
    }

    pub fn cancel_task(&self, id: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_task(id);
        }
    }

    pub fn drain_ui(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_ui();
        }
    }

    pub fn has_pending_ui(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_pending_ui())
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(self) {
        self.runtime.cancel_task(self.id);
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle").field("id", &self.id).finish()
    }
}

struct RuntimeTaskWaker {
    scheduler: Arc<dyn RuntimeScheduler>,
    woken: Arc<AtomicBool>,
}

impl RuntimeTaskWaker {
    fn new(scheduler: Arc<dyn RuntimeScheduler>, woken: Arc<AtomicBool>) -> Self {
        Self { scheduler, woken }
    }

    fn into_waker(self) -> Waker {
        futures_task::waker(Arc::new(self))
    }
}

impl futures_task::ArcWake for RuntimeTaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.woken.store(true, Ordering::SeqCst);
        arc_self.scheduler.schedule_frame();
    }
}
