use linkscroll_core::Offset;

/// Where a scroll sample came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NestedScrollSource {
    /// Direct user input such as a drag or a wheel tick.
    UserInput,
    /// Programmatic or animated scrolling such as a fling.
    SideEffect,
}

/// Interception point within one dispatched sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollPhase {
    /// Before the child region consumed anything.
    Pre,
    /// After the child region consumed what it could.
    Post,
}

/// Participant in nested scrolling.
///
/// Connections attached to a [`NestedScrollDispatcher`](super::NestedScrollDispatcher)
/// see every sample twice. Whatever a connection returns is treated as
/// consumed and removed from what later participants are offered. Offsets are
/// in gesture space.
pub trait NestedScrollConnection {
    /// Called before the child consumes `available`. Returns the part claimed.
    fn on_pre_scroll(&self, available: Offset, source: NestedScrollSource) -> Offset {
        let _ = (available, source);
        Offset::ZERO
    }

    /// Called after the child consumed `consumed`; `available` is the residual.
    /// Returns the part of the residual claimed.
    fn on_post_scroll(
        &self,
        consumed: Offset,
        available: Offset,
        source: NestedScrollSource,
    ) -> Offset {
        let _ = (consumed, available, source);
        Offset::ZERO
    }
}
