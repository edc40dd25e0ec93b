use shared::{error::FailureKind, protocol::BACKEND_UNAVAILABLE_MESSAGE};
use thiserror::Error;

/// Failure of a single `convert` call. The display text is what the UI
/// shows in its banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("{}", BACKEND_UNAVAILABLE_MESSAGE)]
    BackendUnavailable,
    #[error("{message}")]
    ConversionRejected { status: u16, message: String },
    #[error("{message}")]
    NetworkFailure { message: String },
    #[error("failed to save MIDI file: {message}")]
    SaveFailed { message: String },
    #[error("a conversion is already in flight")]
    AlreadyInFlight,
}

impl ConversionError {
    pub(crate) fn network(err: impl std::fmt::Display) -> Self {
        Self::NetworkFailure {
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::BackendUnavailable => FailureKind::BackendUnavailable,
            Self::ConversionRejected { .. } => FailureKind::ConversionRejected,
            Self::NetworkFailure { .. } => FailureKind::NetworkFailure,
            Self::SaveFailed { .. } => FailureKind::SaveFailed,
            Self::AlreadyInFlight => FailureKind::Busy,
        }
    }
}
