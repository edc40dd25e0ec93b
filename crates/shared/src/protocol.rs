//! HTTP contract of the conversion backend.

use serde::{Deserialize, Serialize};

use crate::domain::{PageRange, TempoOverride};

pub const HEALTH_PATH: &str = "health";
pub const CONVERT_PATH: &str = "convert";

pub const FIELD_MIDI_FILE_NAME: &str = "midiFileName";
pub const FIELD_TEMPOS: &str = "tempos";
pub const FIELD_SHOULD_PARSE_PAGE_RANGE: &str = "shouldParsePageRange";
pub const FIELD_PAGE_RANGE_START: &str = "pageRangeStart";
pub const FIELD_PAGE_RANGE_END: &str = "pageRangeEnd";
pub const FIELD_FILE: &str = "file";

pub const MIDI_EXTENSION: &str = ".mid";
pub const FALLBACK_MIDI_FILE_NAME: &str = "myFile.mid";
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";
pub const BACKEND_UNAVAILABLE_MESSAGE: &str = "Backend is not available. Please try again later.";

/// One entry of the JSON-encoded `tempos` multipart field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<i64>,
    pub measure: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
}

impl TempoPayload {
    /// Returns `None` when the row has no measure; such rows never pass
    /// validation.
    pub fn from_override(row: &TempoOverride) -> Option<Self> {
        Some(Self {
            tempo: row.tempo,
            measure: row.measure?,
            force: row.force,
        })
    }
}

pub fn encode_tempos(tempos: &[TempoPayload]) -> serde_json::Result<String> {
    serde_json::to_string(tempos)
}

/// Page bounds sent alongside the upload when page-range parsing is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRangePayload {
    pub start: i64,
    pub end: i64,
}

impl PageRangePayload {
    pub fn from_range(range: &PageRange) -> Option<Self> {
        if !range.enabled {
            return None;
        }
        Some(Self {
            start: range.start?,
            end: range.end?,
        })
    }
}

/// Body returned by the backend alongside a non-success status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ConvertErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Extracts the backend message from a raw body, falling back to
    /// [`GENERIC_ERROR_MESSAGE`] when it is missing or unparseable.
    pub fn message_from_bytes(body: &[u8]) -> String {
        serde_json::from_slice::<Self>(body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
    }
}

pub fn midi_file_name(midi_file_name: &str) -> String {
    if midi_file_name.trim().is_empty() {
        FALLBACK_MIDI_FILE_NAME.to_string()
    } else {
        format!("{midi_file_name}{MIDI_EXTENSION}")
    }
}
