//! Forwards a damped copy of every scroll sample to an outer region.
//!
//! Attached to the dispatcher of an inner region, the connection never claims
//! any of the offered delta. It scales what it sees at each enabled phase by
//! the scroll factor and asks the outer region to scroll by the negated
//! vertical component, so both regions move in the gesture's visual direction.

use super::config::{DispatchPolicy, ForwardingConfig, ForwardingPhases, ScrollFactor};
use super::connection::{NestedScrollConnection, NestedScrollSource, ScrollPhase};
use super::error::ForwardingError;
use super::mailbox::ForwardingMailbox;
use crate::scrollable::{ScrollableRegion, SharedRegion};
use linkscroll_core::{Offset, RuntimeHandle, TaskHandle};
use std::cell::Cell;
use std::rc::{Rc, Weak};

/// Counters describing what a connection has done so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ForwardingStats {
    /// Pre and post calls received, forwarded or not.
    pub intercepted: u64,
    /// Deltas handed to the runtime (fire-and-forget) or to the mailbox.
    pub dispatched: u64,
    /// Mailbox samples dropped in favour of a newer one.
    pub coalesced: u64,
    /// `scroll_by` requests that completed against a live outer region.
    pub applied: u64,
}

#[derive(Default)]
struct StatsCell(Cell<ForwardingStats>);

impl StatsCell {
    fn update(&self, f: impl FnOnce(&mut ForwardingStats)) {
        let mut stats = self.0.get();
        f(&mut stats);
        self.0.set(stats);
    }

    fn get(&self) -> ForwardingStats {
        self.0.get()
    }
}

enum Dispatch {
    FireAndForget,
    Coalescing {
        mailbox: Rc<ForwardingMailbox>,
        consumer: Option<TaskHandle>,
    },
}

/// Nested-scroll connection that couples an inner region to an outer one.
///
/// Only a weak reference to the outer region is kept. Once the region is
/// gone, forwarded deltas are dropped without reaching the gesture pipeline.
pub struct ForwardingScrollConnection {
    outer: Weak<dyn ScrollableRegion>,
    factor: ScrollFactor,
    phases: ForwardingPhases,
    policy: DispatchPolicy,
    runtime: RuntimeHandle,
    dispatch: Dispatch,
    stats: Rc<StatsCell>,
}

impl ForwardingScrollConnection {
    /// Connection forwarding at both phases with the default coalescing
    /// policy. Fails if `scroll_factor` is outside `(0, 1]`.
    pub fn new(
        outer: &impl SharedRegion,
        scroll_factor: f32,
        runtime: RuntimeHandle,
    ) -> Result<Self, ForwardingError> {
        ForwardingConfig::default()
            .with_scroll_factor(scroll_factor)
            .build(outer, runtime)
    }

    pub(crate) fn with_parts(
        outer: Weak<dyn ScrollableRegion>,
        factor: ScrollFactor,
        phases: ForwardingPhases,
        policy: DispatchPolicy,
        runtime: RuntimeHandle,
    ) -> Result<Self, ForwardingError> {
        let stats = Rc::new(StatsCell::default());
        let dispatch = match policy {
            DispatchPolicy::FireAndForget => Dispatch::FireAndForget,
            DispatchPolicy::Coalescing { capacity } => {
                let mailbox = Rc::new(ForwardingMailbox::new(capacity));
                let consumer = runtime
                    .spawn_ui(run_consumer(
                        Rc::clone(&mailbox),
                        outer.clone(),
                        Rc::clone(&stats),
                    ))
                    .ok_or(ForwardingError::RuntimeUnavailable)?;
                Dispatch::Coalescing {
                    mailbox,
                    consumer: Some(consumer),
                }
            }
        };
        log::debug!(
            "forwarding connection created: factor {} phases {phases:?} policy {policy:?}",
            factor.get()
        );
        Ok(Self {
            outer,
            factor,
            phases,
            policy,
            runtime,
            dispatch,
            stats,
        })
    }

    pub fn scroll_factor(&self) -> ScrollFactor {
        self.factor
    }

    pub fn phases(&self) -> ForwardingPhases {
        self.phases
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    pub fn stats(&self) -> ForwardingStats {
        self.stats.get()
    }

    /// Samples waiting in the coalescing mailbox; always zero for
    /// fire-and-forget.
    pub fn pending_forwardings(&self) -> usize {
        match &self.dispatch {
            Dispatch::FireAndForget => 0,
            Dispatch::Coalescing { mailbox, .. } => mailbox.len(),
        }
    }

    fn intercept(&self, phase: ScrollPhase, available: Offset) -> Offset {
        self.stats.update(|stats| stats.intercepted += 1);
        if !self.phases.forwards(phase) {
            return Offset::ZERO;
        }
        let adjusted = available * self.factor.get();
        let delta = -adjusted.y;
        if !delta.is_finite() {
            log::warn!("not forwarding non-finite delta at {phase:?}: {available:?}");
            return Offset::ZERO;
        }
        match &self.dispatch {
            Dispatch::FireAndForget => self.spawn_forwarding(delta),
            Dispatch::Coalescing { mailbox, .. } => {
                let queued = match phase {
                    ScrollPhase::Pre => {
                        mailbox.offer(delta, self.phases.forwards(ScrollPhase::Post))
                    }
                    ScrollPhase::Post => mailbox.offer_residual(delta),
                };
                if queued {
                    self.stats.update(|stats| stats.dispatched += 1);
                } else {
                    log::trace!("forwarding mailbox closed; dropped {delta}");
                }
            }
        }
        Offset::ZERO
    }

    fn spawn_forwarding(&self, delta: f32) {
        let outer = self.outer.clone();
        let stats = Rc::clone(&self.stats);
        let spawned = self.runtime.spawn_ui(async move {
            let Some(region) = outer.upgrade() else {
                log::debug!("outer region gone; forwarding of {delta} dropped");
                return;
            };
            let applied = region.scroll_by(delta).await;
            stats.update(|stats| stats.applied += 1);
            log::trace!("forwarded {delta}, outer applied {applied}");
        });
        match spawned {
            Some(_) => self.stats.update(|stats| stats.dispatched += 1),
            None => log::debug!("runtime gone; forwarding of {delta} dropped"),
        }
    }
}

async fn run_consumer(
    mailbox: Rc<ForwardingMailbox>,
    outer: Weak<dyn ScrollableRegion>,
    stats: Rc<StatsCell>,
) {
    while let Some(batch) = mailbox.recv().await {
        if batch.discarded > 0 {
            stats.update(|stats| stats.coalesced += batch.discarded as u64);
        }
        let Some(region) = outer.upgrade() else {
            log::debug!("outer region gone; stopping forwarding consumer");
            mailbox.close();
            return;
        };
        let applied = region.scroll_by(batch.latest).await;
        stats.update(|stats| stats.applied += 1);
        log::trace!(
            "forwarded {} ({} coalesced), outer applied {applied}",
            batch.latest,
            batch.discarded
        );
    }
}

impl NestedScrollConnection for ForwardingScrollConnection {
    fn on_pre_scroll(&self, available: Offset, _source: NestedScrollSource) -> Offset {
        self.intercept(ScrollPhase::Pre, available)
    }

    fn on_post_scroll(
        &self,
        _consumed: Offset,
        available: Offset,
        _source: NestedScrollSource,
    ) -> Offset {
        self.intercept(ScrollPhase::Post, available)
    }
}

impl Drop for ForwardingScrollConnection {
    fn drop(&mut self) {
        if let Dispatch::Coalescing { mailbox, consumer } = &mut self.dispatch {
            mailbox.close();
            if let Some(consumer) = consumer.take() {
                consumer.cancel();
            }
        }
    }
}

impl std::fmt::Debug for ForwardingScrollConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardingScrollConnection")
            .field("factor", &self.factor)
            .field("phases", &self.phases)
            .field("policy", &self.policy)
            .field("stats", &self.stats.get())
            .finish()
    }
}
