use serde::{Deserialize, Serialize};

/// Why a single form field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Required,
    BelowMin,
    AboveMax,
}

/// Coarse classification of a failed submission, used to pick where the UI
/// surfaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    BackendUnavailable,
    ConversionRejected,
    NetworkFailure,
    SaveFailed,
    Busy,
}

impl FailureKind {
    /// Validation failures render inline next to their field; everything
    /// else is a top-level banner.
    pub fn is_inline(self) -> bool {
        matches!(self, Self::Validation)
    }
}
