//! Nested scrolling: the interception pipeline and the forwarding connection
//! that links an inner region to an outer one.

mod config;
mod connection;
mod dispatcher;
mod error;
mod forwarding;
mod mailbox;

pub use config::{DispatchPolicy, ForwardingConfig, ForwardingPhases, ScrollFactor};
pub use connection::{NestedScrollConnection, NestedScrollSource, ScrollPhase};
pub use dispatcher::{NestedScrollDispatcher, NestedScrollResult};
pub use error::ForwardingError;
pub use forwarding::{ForwardingScrollConnection, ForwardingStats};
