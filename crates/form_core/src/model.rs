use shared::{
    domain::{PageRange, RowId, SheetFile, TempoBounds, TempoOverride, DEFAULT_TEMPO},
    protocol::{PageRangePayload, TempoPayload},
};
use thiserror::Error;
use tracing::debug;

use crate::{
    attachment::FileAttachment,
    validation::{FieldErrors, ValidationSchema},
};

/// What happens to a hand-edited MIDI name when the sheet changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// The name always follows the attached sheet.
    #[default]
    AlwaysOverwrite,
    /// A name the user typed survives attach and detach until the next reset.
    PreserveManualEdit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormConfig {
    pub tempo_bounds: TempoBounds,
    pub default_tempo: i64,
    pub name_policy: NamePolicy,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            tempo_bounds: TempoBounds::default(),
            default_tempo: DEFAULT_TEMPO,
            name_policy: NamePolicy::default(),
        }
    }
}

/// User-editable values of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub midi_file_name: String,
    pub tempo_overrides: Vec<TempoOverride>,
    pub page_range: PageRange,
}

impl FormValues {
    fn same_values(&self, other: &Self) -> bool {
        self.midi_file_name == other.midi_file_name
            && self.page_range == other.page_range
            && self.tempo_overrides.len() == other.tempo_overrides.len()
            && self
                .tempo_overrides
                .iter()
                .zip(&other.tempo_overrides)
                .all(|(a, b)| a.same_values(b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    MidiFileName,
    Tempo(RowId),
    Measure(RowId),
    Force(RowId),
    PageRangeEnabled,
    PageRangeStart,
    PageRangeEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(Option<i64>),
    Flag(bool),
}

impl FieldValue {
    /// Parses raw numeric input; anything that is not an integer clears the
    /// field.
    pub fn integer_input(raw: &str) -> Self {
        Self::Integer(raw.trim().parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("no tempo override with id {0}")]
    UnknownRow(RowId),
    #[error("{field:?} expects a {expected} value")]
    TypeMismatch {
        field: FormField,
        expected: &'static str,
    },
}

/// Immutable copy of the form handed to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    pub values: FormValues,
    pub attached_file: Option<SheetFile>,
    pub is_dirty: bool,
    pub errors: FieldErrors,
}

impl FormSnapshot {
    pub fn is_submittable(&self) -> bool {
        self.attached_file.is_some() && self.errors.is_empty()
    }

    /// `None` if any row lacks a measure.
    pub fn tempo_payloads(&self) -> Option<Vec<TempoPayload>> {
        self.values
            .tempo_overrides
            .iter()
            .map(TempoPayload::from_override)
            .collect()
    }

    pub fn page_range_payload(&self) -> Option<PageRangePayload> {
        PageRangePayload::from_range(&self.values.page_range)
    }
}

#[derive(Debug, Clone)]
pub struct FormModel {
    config: FormConfig,
    schema: ValidationSchema,
    initial: FormValues,
    values: FormValues,
    attachment: FileAttachment,
    errors: FieldErrors,
    is_dirty: bool,
    name_edited: bool,
    next_row_id: u64,
}

impl Default for FormModel {
    fn default() -> Self {
        Self::new(FormConfig::default())
    }
}

impl FormModel {
    pub fn new(config: FormConfig) -> Self {
        let initial = FormValues {
            midi_file_name: String::new(),
            tempo_overrides: vec![TempoOverride {
                id: RowId(0),
                tempo: Some(config.default_tempo),
                measure: Some(1),
                force: None,
            }],
            page_range: PageRange::default(),
        };

        Self {
            config,
            schema: ValidationSchema::new(config.tempo_bounds),
            values: initial.clone(),
            initial,
            attachment: FileAttachment::default(),
            errors: FieldErrors::new(),
            is_dirty: false,
            name_edited: false,
            next_row_id: 1,
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn schema(&self) -> &ValidationSchema {
        &self.schema
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn tempo_overrides(&self) -> &[TempoOverride] {
        &self.values.tempo_overrides
    }

    pub fn attached_file(&self) -> Option<&SheetFile> {
        self.attachment.file()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn can_remove_tempo_override(&self) -> bool {
        self.values.tempo_overrides.len() > 1
    }

    /// Nothing typed and nothing attached.
    pub fn is_pristine_and_empty(&self) -> bool {
        !self.is_dirty && self.attachment.file().is_none()
    }

    pub fn set_field(&mut self, field: FormField, value: FieldValue) -> Result<(), FormError> {
        match (field, value) {
            (FormField::MidiFileName, FieldValue::Text(name)) => {
                self.values.midi_file_name = name;
                self.name_edited = true;
            }
            (FormField::Tempo(id), FieldValue::Integer(tempo)) => {
                self.row_mut(id)?.tempo = tempo;
            }
            (FormField::Measure(id), FieldValue::Integer(measure)) => {
                self.row_mut(id)?.measure = measure;
            }
            (FormField::Force(id), FieldValue::Flag(force)) => {
                self.row_mut(id)?.force = Some(force);
            }
            (FormField::PageRangeEnabled, FieldValue::Flag(enabled)) => {
                self.values.page_range.enabled = enabled;
            }
            (FormField::PageRangeStart, FieldValue::Integer(start)) => {
                self.values.page_range.start = start;
            }
            (FormField::PageRangeEnd, FieldValue::Integer(end)) => {
                self.values.page_range.end = end;
            }
            (field, _) => {
                return Err(FormError::TypeMismatch {
                    field,
                    expected: expected_kind(field),
                });
            }
        }

        self.refresh();
        Ok(())
    }

    pub fn add_tempo_override(&mut self) -> RowId {
        let id = RowId(self.next_row_id);
        self.next_row_id += 1;
        let measure = self.values.tempo_overrides.len() as i64 + 1;
        self.values.tempo_overrides.push(TempoOverride {
            id,
            tempo: Some(self.config.default_tempo),
            measure: Some(measure),
            force: Some(false),
        });
        self.refresh();
        id
    }

    /// Returns `false` without touching the form when `id` is the last row.
    pub fn remove_tempo_override(&mut self, id: RowId) -> Result<bool, FormError> {
        let Some(index) = self
            .values
            .tempo_overrides
            .iter()
            .position(|row| row.id == id)
        else {
            return Err(FormError::UnknownRow(id));
        };
        if !self.can_remove_tempo_override() {
            debug!(row = %id, "keeping the last tempo override");
            return Ok(false);
        }

        self.values.tempo_overrides.remove(index);
        self.refresh();
        Ok(true)
    }

    /// Replaces the attached sheet and applies the derived name in one step.
    pub fn attach_file(&mut self, file: Option<SheetFile>) {
        let change = self.attachment.on_file_change(file);
        let keep_name = self.config.name_policy == NamePolicy::PreserveManualEdit
            && self.name_edited
            && !self.values.midi_file_name.trim().is_empty();

        if keep_name {
            debug!(
                midi_file_name = %self.values.midi_file_name,
                "keeping manually edited midi file name"
            );
        } else {
            self.values.midi_file_name = change.suggested_name;
            self.name_edited = false;
        }
        self.refresh();
    }

    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.attachment = FileAttachment::default();
        self.errors.clear();
        self.is_dirty = false;
        self.name_edited = false;
    }

    /// Runs the full schema regardless of what has been touched.
    pub fn validate(&mut self) -> &FieldErrors {
        self.errors = self.schema.validate(&self.values);
        &self.errors
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            values: self.values.clone(),
            attached_file: self.attachment.file().cloned(),
            is_dirty: self.is_dirty,
            errors: self.errors.clone(),
        }
    }

    fn row_mut(&mut self, id: RowId) -> Result<&mut TempoOverride, FormError> {
        self.values
            .tempo_overrides
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(FormError::UnknownRow(id))
    }

    fn refresh(&mut self) {
        self.is_dirty = !self.values.same_values(&self.initial);
        self.errors = self.schema.validate(&self.values);
    }
}

fn expected_kind(field: FormField) -> &'static str {
    match field {
        FormField::MidiFileName => "text",
        FormField::Force(_) | FormField::PageRangeEnabled => "flag",
        FormField::Tempo(_)
        | FormField::Measure(_)
        | FormField::PageRangeStart
        | FormField::PageRangeEnd => "integer",
    }
}

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
