use crate::lazy::LazyListState;
use crate::scroll_state::ScrollState;
use crate::scrollable::{ScrollFuture, ScrollableRegion, ScrollableState};
use std::future::Future;
use std::task::{Context, Poll};

fn poll_once(future: &mut ScrollFuture) -> Poll<f32> {
    let mut cx = Context::from_waker(futures_task::noop_waker_ref());
    future.as_mut().poll(&mut cx)
}

#[test]
fn scroll_state_clamps_to_bounds() {
    let state = ScrollState::new(0.0, 200.0);
    assert_eq!(state.dispatch_raw_delta(-10.0), 0.0);
    assert!(!state.can_scroll_backward());

    assert_eq!(state.consume_scroll_delta(150.0), 150.0);
    assert_eq!(state.consume_scroll_delta(150.0), 50.0);
    assert_eq!(state.value(), 200.0);
    assert!(!state.can_scroll_forward());

    state.set_max_value(120.0);
    assert_eq!(state.value(), 120.0);
}

#[test]
fn scroll_state_scroll_by_resolves_immediately() {
    let state = ScrollState::new(40.0, 100.0);
    let mut request = state.scroll_by(-25.0);
    assert_eq!(poll_once(&mut request), Poll::Ready(-25.0));
    assert_eq!(state.scroll_offset(), 15.0);
}

#[test]
fn disposed_scroll_state_ignores_deltas() {
    let state = ScrollState::new(40.0, 100.0);
    state.dispose();
    assert_eq!(state.consume_scroll_delta(10.0), 0.0);
    let mut request = state.scroll_by(10.0);
    assert_eq!(poll_once(&mut request), Poll::Ready(0.0));
    state.scroll_to(0.0);
    assert_eq!(state.value(), 40.0);
    assert!(state.is_disposed());
}

#[test]
fn lazy_list_defers_scroll_until_measure() {
    // Pager item of 200 followed by a grid item of 800, 600 visible.
    let list = LazyListState::new(vec![200.0, 800.0], 600.0);
    assert_eq!(list.max_scroll_offset(), 400.0);

    let mut request = list.scroll_by(250.0);
    assert_eq!(poll_once(&mut request), Poll::Pending);
    assert!(list.is_scroll_in_progress());
    assert_eq!(list.peek_scroll_delta(), 250.0);
    assert_eq!(list.scroll_offset(), 0.0);

    let measured = list.measure();
    assert_eq!(measured.consumed, 250.0);
    assert_eq!(measured.resumed, 1);
    assert_eq!(poll_once(&mut request), Poll::Ready(250.0));
    assert!(!list.is_scroll_in_progress());

    assert_eq!(list.first_visible_item_index(), 1);
    assert_eq!(list.first_visible_item_scroll_offset(), 50.0);
    assert!(list.can_scroll_forward());
    assert!(list.can_scroll_backward());
}

#[test]
fn lazy_list_shares_clamped_pass_between_waiters() {
    let list = LazyListState::new(vec![200.0, 800.0], 600.0);
    let mut first = list.scroll_by(300.0);
    let mut second = list.scroll_by(500.0);

    let measured = list.measure();
    assert_eq!(measured.requested, 800.0);
    assert_eq!(measured.consumed, 400.0);
    assert_eq!(poll_once(&mut first), Poll::Ready(150.0));
    assert_eq!(poll_once(&mut second), Poll::Ready(250.0));
    assert_eq!(list.scroll_offset(), 400.0);
    assert!(!list.can_scroll_forward());
}

#[test]
fn disposing_lazy_list_releases_waiters() {
    let list = LazyListState::new(vec![500.0, 500.0], 400.0);
    let mut pending = list.scroll_by(100.0);
    list.dispose();

    assert_eq!(poll_once(&mut pending), Poll::Ready(0.0));
    let mut late = list.scroll_by(100.0);
    assert_eq!(poll_once(&mut late), Poll::Ready(0.0));
    assert_eq!(list.measure().consumed, 0.0);
    assert_eq!(list.scroll_offset(), 0.0);
}

#[test]
fn lazy_list_nets_opposite_requests_before_clamping() {
    let list = LazyListState::new(vec![200.0, 800.0], 800.0);
    let mut to_end = list.scroll_by(200.0);
    list.measure();
    assert_eq!(poll_once(&mut to_end), Poll::Ready(200.0));

    let mut forward = list.scroll_by(100.0);
    let mut back = list.scroll_by(-99.0);
    let measured = list.measure();

    assert_eq!(measured.requested, 1.0);
    assert_eq!(measured.consumed, 0.0);
    assert_eq!(list.scroll_offset(), 200.0);
    assert_eq!(poll_once(&mut forward), Poll::Ready(0.0));
    assert_eq!(poll_once(&mut back), Poll::Ready(0.0));
}

#[test]
fn lazy_list_resize_pulls_offset_back_in_range() {
    let list = LazyListState::new(vec![200.0, 800.0], 600.0);
    let _request = list.scroll_by(400.0);
    list.measure();
    assert_eq!(list.scroll_offset(), 400.0);

    list.set_viewport_extent(900.0);
    assert_eq!(list.max_scroll_offset(), 100.0);
    assert_eq!(list.scroll_offset(), 100.0);

    list.set_item_extents(vec![200.0, 300.0]);
    assert_eq!(list.item_count(), 2);
    assert_eq!(list.scroll_offset(), 0.0);
    assert!(!list.can_scroll_forward());
}
