//! Submit/reset action surface bound to one form and one conversion client.

use std::sync::Arc;

use form_core::{validation::translation_key, FieldValue, FormError, FormField, FormModel, FormSnapshot};
use shared::{
    domain::{FieldPath, RowId, SheetFile},
    error::FailureKind,
    i18n::Translate,
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{ConversionClient, ConversionError, ConversionRequest, ConversionState, SavedMidi};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("no music sheet attached")]
    NoFile,
    #[error("{0} field(s) failed validation")]
    Invalid(usize),
    #[error("a conversion is already in flight")]
    InFlight,
    #[error(transparent)]
    Conversion(ConversionError),
}

impl SubmitError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoFile | Self::Invalid(_) => FailureKind::Validation,
            Self::InFlight => FailureKind::Busy,
            Self::Conversion(err) => err.kind(),
        }
    }

    /// Localization key for the submission-level message, if the failure
    /// has one. Conversion failures carry their own text.
    pub fn translation_key(&self) -> Option<&'static str> {
        match self {
            Self::NoFile => Some("Submit.NoFile"),
            Self::Invalid(_) => Some("Submit.Invalid"),
            Self::InFlight => Some("Submit.InFlight"),
            Self::Conversion(_) => None,
        }
    }
}

impl From<ConversionError> for SubmitError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::AlreadyInFlight => Self::InFlight,
            other => Self::Conversion(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResetError {
    #[error("cannot reset while a conversion is in flight")]
    InFlight,
}

pub struct FormController {
    form: FormModel,
    client: Arc<ConversionClient>,
}

impl FormController {
    pub fn new(form: FormModel, client: Arc<ConversionClient>) -> Self {
        Self { form, client }
    }

    pub fn form(&self) -> &FormModel {
        &self.form
    }

    pub fn client(&self) -> &Arc<ConversionClient> {
        &self.client
    }

    pub fn conversion_state(&self) -> ConversionState {
        self.client.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversionState> {
        self.client.subscribe()
    }

    pub fn set_field(&mut self, field: FormField, value: FieldValue) -> Result<(), FormError> {
        self.form.set_field(field, value)
    }

    pub fn add_tempo_override(&mut self) -> RowId {
        self.form.add_tempo_override()
    }

    pub fn remove_tempo_override(&mut self, id: RowId) -> Result<bool, FormError> {
        self.form.remove_tempo_override(id)
    }

    pub fn attach_file(&mut self, file: Option<SheetFile>) {
        self.form.attach_file(file);
    }

    pub fn can_submit(&self) -> bool {
        self.form.attached_file().is_some()
            && self.form.errors().is_empty()
            && !self.client.is_loading()
    }

    pub fn can_reset(&self) -> bool {
        !(self.form.is_pristine_and_empty() || self.client.is_loading())
    }

    pub fn reset(&mut self) -> Result<(), ResetError> {
        if self.client.is_loading() {
            return Err(ResetError::InFlight);
        }
        self.form.reset();
        Ok(())
    }

    pub async fn submit(&mut self) -> Result<SavedMidi, SubmitError> {
        if self.form.attached_file().is_none() {
            info!("submit rejected: no sheet attached");
            return Err(SubmitError::NoFile);
        }
        if self.client.is_loading() {
            return Err(SubmitError::InFlight);
        }

        let invalid = self.form.validate().len();
        if invalid > 0 {
            info!(invalid_fields = invalid, "submit rejected: form is invalid");
            return Err(SubmitError::Invalid(invalid));
        }

        let request = build_request(self.form.snapshot())?;
        info!(
            midi_file_name = %request.midi_file_name,
            sheet = request.file.file_name(),
            tempo_overrides = request.tempos.len(),
            page_range = ?request.page_range,
            "submitting conversion"
        );

        self.client.convert(request).await.map_err(|err| {
            warn!(error = %err, kind = ?err.kind(), "conversion failed");
            SubmitError::from(err)
        })
    }

    /// Current field errors rendered through `translator`, in field order.
    pub fn field_messages(&self, translator: &dyn Translate) -> Vec<(FieldPath, String)> {
        let schema = self.form.schema();
        self.form
            .errors()
            .iter()
            .map(|(path, kind)| {
                let params = schema.message_params(*path);
                let message = translator.translate(translation_key(*path, *kind), &params);
                (*path, message)
            })
            .collect()
    }
}

fn build_request(snapshot: FormSnapshot) -> Result<ConversionRequest, SubmitError> {
    let invalid = snapshot.errors.len().max(1);
    let tempos = snapshot
        .tempo_payloads()
        .ok_or(SubmitError::Invalid(invalid))?;
    let page_range = snapshot.page_range_payload();
    if snapshot.values.page_range.enabled && page_range.is_none() {
        return Err(SubmitError::Invalid(invalid));
    }
    let file = snapshot.attached_file.ok_or(SubmitError::NoFile)?;

    Ok(ConversionRequest {
        midi_file_name: snapshot.values.midi_file_name,
        tempos,
        page_range,
        file,
    })
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
