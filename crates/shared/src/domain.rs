use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

pub const MIN_TEMPO: i64 = 40;
pub const MAX_TEMPO: i64 = 240;
pub const DEFAULT_TEMPO: i64 = 120;
pub const MIN_MEASURE: i64 = 1;
pub const MIN_PAGE: i64 = 1;

/// Stable identity of a tempo-override row, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row-{}", self.0)
    }
}

/// Inclusive tempo bounds applied to every tempo override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoBounds {
    pub min: i64,
    pub max: i64,
}

impl TempoBounds {
    /// Bounds used by earlier releases of the form.
    pub const WIDE: Self = Self { min: 24, max: 400 };

    pub fn contains(&self, tempo: i64) -> bool {
        (self.min..=self.max).contains(&tempo)
    }
}

impl Default for TempoBounds {
    fn default() -> Self {
        Self {
            min: MIN_TEMPO,
            max: MAX_TEMPO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoOverride {
    pub id: RowId,
    pub tempo: Option<i64>,
    pub measure: Option<i64>,
    pub force: Option<bool>,
}

impl TempoOverride {
    /// Compares the user-visible values, ignoring row identity.
    pub fn same_values(&self, other: &Self) -> bool {
        self.tempo == other.tempo && self.measure == other.measure && self.force == other.force
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub enabled: bool,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
    Png,
    Jpeg,
    Pdf,
}

impl SheetKind {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let mime = mime_guess::from_path(file_name).first()?;
        match (mime.type_().as_str(), mime.subtype().as_str()) {
            ("image", "png") => Some(Self::Png),
            ("image", "jpeg") => Some(Self::Jpeg),
            ("application", "pdf") => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// A music sheet selected by the user: its file name and raw contents.
#[derive(Clone, PartialEq, Eq)]
pub struct SheetFile {
    file_name: String,
    bytes: Arc<[u8]>,
}

impl SheetFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn kind(&self) -> Option<SheetKind> {
        SheetKind::from_file_name(&self.file_name)
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

impl fmt::Debug for SheetFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetFile")
            .field("file_name", &self.file_name)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// Address of a single validated form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "field", content = "row", rename_all = "snake_case")]
pub enum FieldPath {
    MidiFileName,
    Tempo(RowId),
    Measure(RowId),
    PageRangeStart,
    PageRangeEnd,
}
