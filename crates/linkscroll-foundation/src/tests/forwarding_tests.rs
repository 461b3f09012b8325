use crate::nested_scroll::{
    DispatchPolicy, ForwardingConfig, ForwardingError, ForwardingPhases,
    ForwardingScrollConnection, NestedScrollConnection, NestedScrollSource, ScrollFactor,
};
use crate::scrollable::{ScrollFuture, ScrollableRegion};
use linkscroll_core::{DefaultScheduler, Offset, Runtime};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

// Mock outer region recording every scroll_by request.
#[derive(Default)]
struct RecordingRegion {
    requests: RefCell<Vec<f32>>,
    offset: Cell<f32>,
    gate: Rc<GateState>,
}

#[derive(Default)]
struct GateState {
    closed: Cell<bool>,
    wakers: RefCell<Vec<Waker>>,
}

impl RecordingRegion {
    fn gated() -> Self {
        let region = Self::default();
        region.gate.closed.set(true);
        region
    }

    fn open_gate(&self) {
        self.gate.closed.set(false);
        for waker in self.gate.wakers.borrow_mut().drain(..) {
            waker.wake();
        }
    }

    fn requests(&self) -> Vec<f32> {
        self.requests.borrow().clone()
    }
}

struct GatedScroll {
    gate: Rc<GateState>,
    delta: f32,
}

impl Future for GatedScroll {
    type Output = f32;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<f32> {
        if self.gate.closed.get() {
            self.gate.wakers.borrow_mut().push(cx.waker().clone());
            Poll::Pending
        } else {
            Poll::Ready(self.delta)
        }
    }
}

impl ScrollableRegion for RecordingRegion {
    fn scroll_by(&self, delta: f32) -> ScrollFuture {
        self.requests.borrow_mut().push(delta);
        self.offset.set(self.offset.get() + delta);
        Box::pin(GatedScroll {
            gate: Rc::clone(&self.gate),
            delta,
        })
    }

    fn scroll_offset(&self) -> f32 {
        self.offset.get()
    }

    fn is_scroll_in_progress(&self) -> bool {
        self.gate.closed.get()
    }
}

fn runtime() -> Runtime {
    Runtime::new(Arc::new(DefaultScheduler))
}

fn fire_and_forget(
    outer: &Rc<RecordingRegion>,
    factor: f32,
    runtime: &Runtime,
) -> ForwardingScrollConnection {
    ForwardingConfig::default()
        .with_scroll_factor(factor)
        .with_policy(DispatchPolicy::FireAndForget)
        .build(outer, runtime.handle())
        .expect("valid config")
}

const SOURCE: NestedScrollSource = NestedScrollSource::UserInput;

#[test]
fn pre_scroll_forwards_half_of_offered_delta_inverted() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection = fire_and_forget(&outer, 0.5, &runtime);

    let claimed = connection.on_pre_scroll(Offset::vertical(100.0), SOURCE);
    assert_eq!(claimed, Offset::ZERO);
    assert!(outer.requests().is_empty(), "forwarding must not run inline");

    runtime.drain_ui();
    assert_eq!(outer.requests(), vec![-50.0]);
}

#[test]
fn post_scroll_forwards_residual_at_full_factor() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection = fire_and_forget(&outer, 1.0, &runtime);

    let claimed = connection.on_post_scroll(
        Offset::vertical(-60.0),
        Offset::vertical(-40.0),
        SOURCE,
    );
    assert_eq!(claimed, Offset::ZERO);

    runtime.drain_ui();
    assert_eq!(outer.requests(), vec![40.0]);
}

#[test]
fn zero_delta_still_dispatches_a_completing_task() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection = fire_and_forget(&outer, 0.5, &runtime);

    connection.on_pre_scroll(Offset::ZERO, SOURCE);
    assert_eq!(runtime.pending_task_count(), 1);
    runtime.drain_ui();

    assert_eq!(outer.requests().len(), 1);
    assert_eq!(outer.requests()[0].abs(), 0.0);
    assert_eq!(outer.scroll_offset(), 0.0);
    assert_eq!(connection.stats().applied, 1);
    assert_eq!(runtime.pending_task_count(), 0);
}

#[test]
fn connection_never_claims_any_delta() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let samples = [
        Offset::ZERO,
        Offset::vertical(12.5),
        Offset::vertical(-300.0),
        Offset::new(40.0, -2.0),
        Offset::new(-7.0, 0.0),
    ];
    for factor in [0.01, 0.25, 0.5, 1.0] {
        for policy in [DispatchPolicy::FireAndForget, DispatchPolicy::default()] {
            let connection = ForwardingConfig::default()
                .with_scroll_factor(factor)
                .with_policy(policy)
                .build(&outer, runtime.handle())
                .expect("valid config");
            for sample in samples {
                assert_eq!(connection.on_pre_scroll(sample, SOURCE), Offset::ZERO);
                assert_eq!(
                    connection.on_post_scroll(sample, sample, SOURCE),
                    Offset::ZERO
                );
            }
        }
    }
}

#[test]
fn forwarded_magnitude_is_linear_in_offered_delta() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection = fire_and_forget(&outer, 0.25, &runtime);

    connection.on_pre_scroll(Offset::vertical(36.0), SOURCE);
    connection.on_pre_scroll(Offset::vertical(72.0), SOURCE);
    runtime.drain_ui();

    let requests = outer.requests();
    assert_eq!(requests, vec![-9.0, -18.0]);
    assert_eq!(requests[1], requests[0] * 2.0);
}

#[test]
fn horizontal_component_is_ignored() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection = fire_and_forget(&outer, 1.0, &runtime);

    connection.on_pre_scroll(Offset::new(500.0, 10.0), SOURCE);
    runtime.drain_ui();
    assert_eq!(outer.requests(), vec![-10.0]);
}

#[test]
fn rapid_calls_spawn_independent_tasks_that_all_complete() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::gated());
    let connection = fire_and_forget(&outer, 0.5, &runtime);

    for step in 1..=8 {
        connection.on_pre_scroll(Offset::vertical(step as f32), SOURCE);
    }
    assert_eq!(runtime.pending_task_count(), 8);

    runtime.drain_ui();
    // Every task reached the region and is parked on the gate; none was
    // cancelled by a later call.
    assert_eq!(outer.requests().len(), 8);
    assert_eq!(runtime.pending_task_count(), 8);
    assert_eq!(connection.stats().dispatched, 8);

    outer.open_gate();
    runtime.drain_ui();
    assert_eq!(runtime.pending_task_count(), 0);
    assert_eq!(connection.stats().applied, 8);
}

#[test]
fn coalescing_applies_only_the_newest_delta() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection =
        ForwardingScrollConnection::new(&outer, 0.5, runtime.handle()).expect("valid factor");
    assert_eq!(connection.policy(), DispatchPolicy::default());

    for step in 1..=3 {
        connection.on_pre_scroll(Offset::vertical(10.0 * step as f32), SOURCE);
    }
    assert_eq!(connection.pending_forwardings(), 3);
    // Only the consumer task exists.
    assert_eq!(runtime.pending_task_count(), 1);

    runtime.drain_ui();
    assert_eq!(outer.requests(), vec![-15.0]);
    let stats = connection.stats();
    assert_eq!(stats.dispatched, 3);
    assert_eq!(stats.coalesced, 2);
    assert_eq!(stats.applied, 1);
    assert_eq!(connection.pending_forwardings(), 0);
}

#[test]
fn coalescing_buffer_is_bounded() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection = ForwardingConfig::default()
        .with_scroll_factor(1.0)
        .with_policy(DispatchPolicy::Coalescing { capacity: 2 })
        .build(&outer, runtime.handle())
        .expect("valid config");

    for step in 1..=6 {
        connection.on_pre_scroll(Offset::vertical(step as f32), SOURCE);
        assert!(connection.pending_forwardings() <= 2);
    }
    runtime.drain_ui();
    assert_eq!(outer.requests(), vec![-6.0]);
    assert_eq!(connection.stats().coalesced, 5);
}

#[test]
fn coalescing_waits_for_in_flight_scroll_before_next() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::gated());
    let connection = ForwardingConfig::default()
        .with_scroll_factor(1.0)
        .build(&outer, runtime.handle())
        .expect("valid config");

    connection.on_pre_scroll(Offset::vertical(1.0), SOURCE);
    runtime.drain_ui();
    assert_eq!(outer.requests(), vec![-1.0]);

    connection.on_pre_scroll(Offset::vertical(2.0), SOURCE);
    connection.on_pre_scroll(Offset::vertical(3.0), SOURCE);
    runtime.drain_ui();
    assert_eq!(outer.requests(), vec![-1.0], "consumer is still suspended");

    outer.open_gate();
    runtime.drain_ui();
    assert_eq!(outer.requests(), vec![-1.0, -3.0]);
}

#[test]
fn dropping_connection_stops_the_consumer() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection =
        ForwardingScrollConnection::new(&outer, 0.5, runtime.handle()).expect("valid factor");
    assert_eq!(runtime.pending_task_count(), 1);

    drop(connection);
    runtime.drain_ui();
    assert_eq!(runtime.pending_task_count(), 0);
}

#[test]
fn single_phase_configs_forward_once_per_sample() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let pre_only = ForwardingConfig::default()
        .with_phases(ForwardingPhases::PreOnly)
        .with_policy(DispatchPolicy::FireAndForget)
        .build(&outer, runtime.handle())
        .expect("valid config");
    let post_only = ForwardingConfig::default()
        .with_phases(ForwardingPhases::PostOnly)
        .with_policy(DispatchPolicy::FireAndForget)
        .build(&outer, runtime.handle())
        .expect("valid config");

    pre_only.on_pre_scroll(Offset::vertical(20.0), SOURCE);
    pre_only.on_post_scroll(Offset::ZERO, Offset::vertical(20.0), SOURCE);
    post_only.on_pre_scroll(Offset::vertical(40.0), SOURCE);
    post_only.on_post_scroll(Offset::ZERO, Offset::vertical(40.0), SOURCE);
    runtime.drain_ui();

    assert_eq!(outer.requests(), vec![-10.0, -20.0]);
    assert_eq!(pre_only.stats().intercepted, 2);
    assert_eq!(pre_only.stats().dispatched, 1);
    assert_eq!(post_only.stats().dispatched, 1);
}

#[test]
fn invalid_scroll_factors_are_rejected() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    for factor in [0.0, -0.5, 1.5, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        let result = ForwardingScrollConnection::new(&outer, factor, runtime.handle());
        assert!(
            matches!(result, Err(ForwardingError::InvalidScrollFactor { .. })),
            "factor {factor} accepted"
        );
    }
    assert_eq!(ScrollFactor::new(1.0).map(ScrollFactor::get), Ok(1.0));
    assert_eq!(ScrollFactor::default().get(), 0.5);
    // A rejected config never spawns a consumer.
    assert_eq!(runtime.pending_task_count(), 0);
}

#[test]
fn zero_capacity_mailbox_is_rejected() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let result = ForwardingConfig::default()
        .with_policy(DispatchPolicy::Coalescing { capacity: 0 })
        .build(&outer, runtime.handle());
    assert_eq!(result.err(), Some(ForwardingError::InvalidMailboxCapacity));
}

#[test]
fn coalescing_requires_a_live_runtime() {
    let runtime = runtime();
    let handle = runtime.handle();
    drop(runtime);
    let outer = Rc::new(RecordingRegion::default());
    let result = ForwardingScrollConnection::new(&outer, 0.5, handle);
    assert_eq!(result.err(), Some(ForwardingError::RuntimeUnavailable));
}

#[test]
fn dropped_runtime_silently_drops_fire_and_forget() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection = fire_and_forget(&outer, 0.5, &runtime);
    drop(runtime);

    assert_eq!(
        connection.on_pre_scroll(Offset::vertical(10.0), SOURCE),
        Offset::ZERO
    );
    assert_eq!(connection.stats().intercepted, 1);
    assert_eq!(connection.stats().dispatched, 0);
}

#[test]
fn torn_down_outer_region_is_ignored() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let spawning = fire_and_forget(&outer, 0.5, &runtime);
    let coalescing =
        ForwardingScrollConnection::new(&outer, 0.5, runtime.handle()).expect("valid factor");
    drop(outer);

    for connection in [&spawning, &coalescing] {
        assert_eq!(
            connection.on_pre_scroll(Offset::vertical(10.0), SOURCE),
            Offset::ZERO
        );
        assert_eq!(
            connection.on_post_scroll(Offset::ZERO, Offset::vertical(10.0), SOURCE),
            Offset::ZERO
        );
    }
    runtime.drain_ui();

    assert_eq!(spawning.stats().applied, 0);
    assert_eq!(coalescing.stats().applied, 0);
    assert_eq!(runtime.pending_task_count(), 0);
    // The consumer shut the mailbox on its way out.
    coalescing.on_pre_scroll(Offset::vertical(10.0), SOURCE);
    assert_eq!(coalescing.pending_forwardings(), 0);
}

#[test]
fn coalescing_merges_pre_nudge_with_empty_post_residual() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection =
        ForwardingScrollConnection::new(&outer, 0.5, runtime.handle()).expect("valid factor");

    connection.on_pre_scroll(Offset::vertical(-30.0), SOURCE);
    connection.on_post_scroll(Offset::vertical(-30.0), Offset::ZERO, SOURCE);
    assert_eq!(connection.pending_forwardings(), 1);
    runtime.drain_ui();

    assert_eq!(outer.requests(), vec![15.0]);
    let stats = connection.stats();
    assert_eq!(stats.intercepted, 2);
    assert_eq!(stats.dispatched, 2);
    assert_eq!(stats.coalesced, 0);
}

#[test]
fn default_connection_keeps_both_nudges_of_a_sample() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection =
        ForwardingScrollConnection::new(&outer, 0.5, runtime.handle()).expect("valid factor");

    // Child exhausted: the whole sample comes back as residual.
    connection.on_pre_scroll(Offset::vertical(20.0), SOURCE);
    connection.on_post_scroll(Offset::ZERO, Offset::vertical(20.0), SOURCE);
    runtime.drain_ui();

    assert_eq!(outer.requests(), vec![-20.0]);
    assert_eq!(connection.stats().applied, 1);
}

#[test]
fn default_connection_dispatches_zero_delta() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection =
        ForwardingScrollConnection::new(&outer, 0.5, runtime.handle()).expect("valid factor");

    assert_eq!(connection.on_pre_scroll(Offset::ZERO, SOURCE), Offset::ZERO);
    runtime.drain_ui();

    assert_eq!(outer.requests().len(), 1);
    assert_eq!(outer.requests()[0].abs(), 0.0);
    assert_eq!(outer.scroll_offset(), 0.0);
    assert_eq!(connection.stats().dispatched, 1);
    assert_eq!(connection.stats().applied, 1);
}

#[test]
fn pre_only_coalescing_keeps_samples_apart() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection = ForwardingConfig::default()
        .with_phases(ForwardingPhases::PreOnly)
        .build(&outer, runtime.handle())
        .expect("valid config");

    connection.on_pre_scroll(Offset::vertical(10.0), SOURCE);
    connection.on_post_scroll(Offset::ZERO, Offset::vertical(10.0), SOURCE);
    connection.on_pre_scroll(Offset::vertical(30.0), SOURCE);
    runtime.drain_ui();

    assert_eq!(outer.requests(), vec![-15.0]);
    assert_eq!(connection.stats().coalesced, 1);
}

#[test]
fn erased_outer_region_is_accepted() {
    let runtime = runtime();
    let recording = Rc::new(RecordingRegion::default());
    let outer: Rc<dyn ScrollableRegion> = recording.clone();

    let coalescing =
        ForwardingScrollConnection::new(&outer, 0.5, runtime.handle()).expect("valid factor");
    let spawning = ForwardingConfig::default()
        .with_policy(DispatchPolicy::FireAndForget)
        .build(&outer, runtime.handle())
        .expect("valid config");
    coalescing.on_pre_scroll(Offset::vertical(8.0), SOURCE);
    spawning.on_pre_scroll(Offset::vertical(2.0), SOURCE);
    runtime.drain_ui();

    assert_eq!(recording.requests(), vec![-4.0, -1.0]);

    // The connection holds no strong reference of its own.
    drop(outer);
    assert_eq!(Rc::strong_count(&recording), 1);
}

#[test]
fn parked_consumer_does_not_hold_a_frame() {
    let runtime = runtime();
    let outer = Rc::new(RecordingRegion::default());
    let connection =
        ForwardingScrollConnection::new(&outer, 0.5, runtime.handle()).expect("valid factor");
    runtime.drain_ui();
    assert!(runtime.has_pending_ui());
    assert!(!runtime.needs_frame());

    connection.on_pre_scroll(Offset::vertical(6.0), SOURCE);
    assert!(runtime.needs_frame());
    runtime.drain_ui();
    assert_eq!(outer.requests(), vec![-3.0]);
    assert!(!runtime.needs_frame());
}
