use std::collections::BTreeMap;

use shared::{
    domain::{FieldPath, PageRange, TempoBounds, TempoOverride, MIN_MEASURE, MIN_PAGE},
    error::ErrorKind,
};

use crate::model::FormValues;

pub type FieldErrors = BTreeMap<FieldPath, ErrorKind>;

/// Declarative per-field rules. Stateless apart from the configured tempo
/// bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationSchema {
    tempo_bounds: TempoBounds,
}

impl ValidationSchema {
    pub fn new(tempo_bounds: TempoBounds) -> Self {
        Self { tempo_bounds }
    }

    pub fn tempo_bounds(&self) -> TempoBounds {
        self.tempo_bounds
    }

    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if values.midi_file_name.trim().is_empty() {
            errors.insert(FieldPath::MidiFileName, ErrorKind::Required);
        }

        for row in &values.tempo_overrides {
            self.validate_tempo_row(row, &mut errors);
        }

        validate_page_range(&values.page_range, &mut errors);
        errors
    }

    fn validate_tempo_row(&self, row: &TempoOverride, errors: &mut FieldErrors) {
        if let Some(tempo) = row.tempo {
            if tempo < self.tempo_bounds.min {
                errors.insert(FieldPath::Tempo(row.id), ErrorKind::BelowMin);
            } else if tempo > self.tempo_bounds.max {
                errors.insert(FieldPath::Tempo(row.id), ErrorKind::AboveMax);
            }
        }

        match row.measure {
            None => {
                errors.insert(FieldPath::Measure(row.id), ErrorKind::Required);
            }
            Some(measure) if measure < MIN_MEASURE => {
                errors.insert(FieldPath::Measure(row.id), ErrorKind::BelowMin);
            }
            Some(_) => {}
        }
    }

    /// Params substituted into the message for `path`.
    pub fn message_params(&self, path: FieldPath) -> Vec<(&'static str, String)> {
        match path {
            FieldPath::Tempo(_) => vec![
                ("minTempo", self.tempo_bounds.min.to_string()),
                ("maxTempo", self.tempo_bounds.max.to_string()),
            ],
            _ => Vec::new(),
        }
    }
}

// Start and end are not compared against each other.
fn validate_page_range(range: &PageRange, errors: &mut FieldErrors) {
    if !range.enabled {
        return;
    }

    for (path, page) in [
        (FieldPath::PageRangeStart, range.start),
        (FieldPath::PageRangeEnd, range.end),
    ] {
        match page {
            None => {
                errors.insert(path, ErrorKind::Required);
            }
            Some(page) if page < MIN_PAGE => {
                errors.insert(path, ErrorKind::BelowMin);
            }
            Some(_) => {}
        }
    }
}

pub fn translation_key(path: FieldPath, kind: ErrorKind) -> &'static str {
    match (path, kind) {
        (FieldPath::MidiFileName, ErrorKind::Required) => "Validation.MidiFileNameRequired",
        (FieldPath::Tempo(_), ErrorKind::BelowMin) => "Validation.TempoMin",
        (FieldPath::Tempo(_), ErrorKind::AboveMax) => "Validation.TempoMax",
        (FieldPath::Measure(_), ErrorKind::Required) => "Validation.MeasureRequired",
        (FieldPath::Measure(_), ErrorKind::BelowMin) => "Validation.MeasureMin",
        (FieldPath::PageRangeStart | FieldPath::PageRangeEnd, ErrorKind::Required) => {
            "Validation.PageRangeRequired"
        }
        (FieldPath::PageRangeStart | FieldPath::PageRangeEnd, ErrorKind::BelowMin) => {
            "Validation.PageRange"
        }
        _ => "Validation.Invalid",
    }
}
