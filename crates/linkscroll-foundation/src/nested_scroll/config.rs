//! Configuration for [`ForwardingScrollConnection`](super::ForwardingScrollConnection).

use super::connection::ScrollPhase;
use super::error::ForwardingError;
use super::forwarding::ForwardingScrollConnection;
use crate::scrollable::SharedRegion;
use linkscroll_core::RuntimeHandle;

/// Damping applied to forwarded motion, validated to lie in `(0, 1]`.
///
/// `1.0` forwards at the same speed as the gesture, `0.5` at half speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollFactor(f32);

impl ScrollFactor {
    pub const DEFAULT: ScrollFactor = ScrollFactor(0.5);

    pub fn new(factor: f32) -> Result<Self, ForwardingError> {
        if factor.is_finite() && factor > 0.0 && factor <= 1.0 {
            Ok(Self(factor))
        } else {
            Err(ForwardingError::InvalidScrollFactor { factor })
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ScrollFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f32> for ScrollFactor {
    type Error = ForwardingError;

    fn try_from(factor: f32) -> Result<Self, Self::Error> {
        Self::new(factor)
    }
}

/// Which interception phases forward to the outer region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ForwardingPhases {
    /// Forward at both phases. While the child can still scroll, each sample
    /// nudges the outer region twice.
    #[default]
    Both,
    PreOnly,
    PostOnly,
}

impl ForwardingPhases {
    pub fn forwards(self, phase: ScrollPhase) -> bool {
        matches!(
            (self, phase),
            (ForwardingPhases::Both, _)
                | (ForwardingPhases::PreOnly, ScrollPhase::Pre)
                | (ForwardingPhases::PostOnly, ScrollPhase::Post)
        )
    }
}

/// How forwarded deltas reach the outer region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchPolicy {
    /// One consumer task drains a ring buffer of `capacity` pending samples
    /// and applies only the newest; the rest are dropped. The pre and post
    /// deltas of one sample share an entry, so both nudges survive. A full
    /// buffer overwrites its oldest entry.
    Coalescing { capacity: usize },
    /// One independent task per interception. Tasks are never cancelled and
    /// may complete in any order.
    FireAndForget,
}

impl DispatchPolicy {
    pub const DEFAULT_CAPACITY: usize = 4;
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        DispatchPolicy::Coalescing {
            capacity: Self::DEFAULT_CAPACITY,
        }
    }
}

/// Factory for forwarding connections.
///
/// ```rust
/// use linkscroll_core::{DefaultScheduler, Runtime};
/// use linkscroll_foundation::{DispatchPolicy, ForwardingConfig, ScrollState};
/// use std::rc::Rc;
/// use std::sync::Arc;
///
/// let runtime = Runtime::new(Arc::new(DefaultScheduler));
/// let outer = Rc::new(ScrollState::new(0.0, 1_000.0));
/// let connection = ForwardingConfig::default()
///     .with_scroll_factor(0.75)
///     .with_policy(DispatchPolicy::FireAndForget)
///     .build(&outer, runtime.handle())
///     .expect("valid config");
/// assert_eq!(connection.scroll_factor().get(), 0.75);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForwardingConfig {
    pub scroll_factor: f32,
    pub phases: ForwardingPhases,
    pub policy: DispatchPolicy,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            scroll_factor: ScrollFactor::DEFAULT.get(),
            phases: ForwardingPhases::default(),
            policy: DispatchPolicy::default(),
        }
    }
}

impl ForwardingConfig {
    pub fn with_scroll_factor(mut self, scroll_factor: f32) -> Self {
        self.scroll_factor = scroll_factor;
        self
    }

    pub fn with_phases(mut self, phases: ForwardingPhases) -> Self {
        self.phases = phases;
        self
    }

    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validates the config and binds a connection to `outer` and `runtime`.
    pub fn build(
        self,
        outer: &impl SharedRegion,
        runtime: RuntimeHandle,
    ) -> Result<ForwardingScrollConnection, ForwardingError> {
        let factor = ScrollFactor::new(self.scroll_factor)?;
        if let DispatchPolicy::Coalescing { capacity: 0 } = self.policy {
            return Err(ForwardingError::InvalidMailboxCapacity);
        }
        ForwardingScrollConnection::with_parts(
            outer.downgrade_region(),
            factor,
            self.phases,
            self.policy,
            runtime,
        )
    }
}
