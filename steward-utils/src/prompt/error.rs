use thiserror::Error;

/// Why a running flow stopped early.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The invoker did not answer in time. Nothing is persisted.
    #[error("no reply arrived before the prompt timed out")]
    TimedOut,
    /// A transport call the flow depends on failed.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// A reply that cannot be accepted; the step asks again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    Invalid(String),
    Duplicate(String),
    Unavailable(String),
}

impl Rejection {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Text shown in place of the question's description.
    pub fn message(&self) -> &str {
        match self {
            Self::Invalid(message) | Self::Duplicate(message) | Self::Unavailable(message) => {
                message
            }
        }
    }
}
