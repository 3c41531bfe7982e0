use thiserror::Error;

/// Errors that can occur while dispatching through a delegate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelegateError {
    /// The receiver object was dropped before the delegate was invoked
    #[error("receiver of type `{receiver}` was dropped before the delegate was invoked")]
    StaleReceiver { receiver: &'static str },

    /// A mutating method was invoked while its receiver was already borrowed
    #[error("receiver of type `{receiver}` is already borrowed")]
    ReceiverBusy { receiver: &'static str },

    /// A multicast dispatch stopped at the given entry
    #[error("broadcast aborted at entry {position} of {total}: {source}")]
    Broadcast {
        position: usize,
        total: usize,
        #[source]
        source: Box<DelegateError>,
    },
}

impl DelegateError {
    /// Returns true if this error (or the error it wraps) is a dropped receiver
    pub fn is_stale(&self) -> bool {
        match self {
            DelegateError::StaleReceiver { .. } => true,
            DelegateError::Broadcast { source, .. } => source.is_stale(),
            DelegateError::ReceiverBusy { .. } => false,
        }
    }

    /// The error raised by the delegate itself, unwrapping broadcast context
    pub fn root_cause(&self) -> &DelegateError {
        match self {
            DelegateError::Broadcast { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type for delegate operations
pub type Result<T> = std::result::Result<T, DelegateError>;
