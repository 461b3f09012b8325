#[derive(Debug, Clone, PartialEq)]
pub enum ForwardingError {
    /// Scroll factor outside `(0, 1]` or not finite.
    InvalidScrollFactor { factor: f32 },
    /// Coalescing mailbox configured with no room.
    InvalidMailboxCapacity,
    /// The runtime was dropped before the forwarding consumer could start.
    RuntimeUnavailable,
}

impl std::fmt::Display for ForwardingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForwardingError::InvalidScrollFactor { factor } => {
                write!(f, "scroll factor {factor} must be finite and within (0, 1]")
            }
            ForwardingError::InvalidMailboxCapacity => {
                write!(f, "coalescing mailbox capacity must be at least 1")
            }
            ForwardingError::RuntimeUnavailable => {
                write!(f, "runtime dropped before forwarding could start")
            }
        }
    }
}

impl std::error::Error for ForwardingError {}
