use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::SheetFile,
    protocol::{
        encode_tempos, midi_file_name, ConvertErrorBody, PageRangePayload, TempoPayload,
        CONVERT_PATH, FIELD_FILE, FIELD_MIDI_FILE_NAME, FIELD_PAGE_RANGE_END,
        FIELD_PAGE_RANGE_START, FIELD_SHOULD_PARSE_PAGE_RANGE, FIELD_TEMPOS, HEALTH_PATH,
    },
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub mod config;
pub mod controller;
pub mod error;
pub mod saver;

pub use config::{ClientConfig, ConfigError, DEFAULT_BACKEND_URL};
pub use controller::{FormController, ResetError, SubmitError};
pub use error::ConversionError;
pub use saver::{DirectorySaver, FileSaver};

/// Everything the backend needs for one conversion. Consumed by
/// [`ConversionClient::convert`].
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub midi_file_name: String,
    pub tempos: Vec<TempoPayload>,
    pub page_range: Option<PageRangePayload>,
    pub file: SheetFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMidi {
    pub file_name: String,
    pub location: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConversionState {
    #[default]
    Idle,
    CheckingHealth,
    Uploading,
    Succeeded(SavedMidi),
    Failed(ConversionError),
}

impl ConversionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::CheckingHealth | Self::Uploading)
    }

    /// Banner text of the last failure, if the last conversion failed.
    pub fn error(&self) -> Option<String> {
        match self {
            Self::Failed(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

/// Drives health check, upload and save for one form. At most one
/// conversion runs at a time; state changes are observable via
/// [`ConversionClient::subscribe`].
pub struct ConversionClient {
    http: Client,
    config: ClientConfig,
    saver: Arc<dyn FileSaver>,
    state: watch::Sender<ConversionState>,
}

impl ConversionClient {
    pub fn new(config: ClientConfig, saver: Arc<dyn FileSaver>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build http client")?;
        let (state, _) = watch::channel(ConversionState::Idle);

        Ok(Self {
            http,
            config,
            saver,
            state,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> ConversionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversionState> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error()
    }

    pub async fn convert(&self, request: ConversionRequest) -> Result<SavedMidi, ConversionError> {
        let mut claimed = false;
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = ConversionState::CheckingHealth;
            claimed = true;
            true
        });
        if !claimed {
            warn!(
                midi_file_name = %request.midi_file_name,
                "conversion already in flight; rejecting request"
            );
            return Err(ConversionError::AlreadyInFlight);
        }

        let mut flight = InFlight::new(&self.state);
        let result = self.run(request).await;
        let terminal = match &result {
            Ok(saved) => ConversionState::Succeeded(saved.clone()),
            Err(err) => ConversionState::Failed(err.clone()),
        };
        flight.finish(terminal);
        result
    }

    async fn run(&self, request: ConversionRequest) -> Result<SavedMidi, ConversionError> {
        self.check_health().await?;

        self.state.send_replace(ConversionState::Uploading);
        let file_name = midi_file_name(&request.midi_file_name);
        let midi = self.upload(request).await?;

        let location = self
            .saver
            .save(&file_name, &midi)
            .await
            .map_err(|err| ConversionError::SaveFailed {
                message: format!("{err:#}"),
            })?;
        info!(file_name = %file_name, location = %location, size_bytes = midi.len(), "saved midi file");

        Ok(SavedMidi {
            file_name,
            location,
            size_bytes: midi.len() as u64,
        })
    }

    async fn check_health(&self) -> Result<(), ConversionError> {
        let url = self.config.endpoint(HEALTH_PATH);
        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(url = %url, status = %response.status(), "backend is healthy");
                Ok(())
            }
            Ok(response) => {
                warn!(url = %url, status = %response.status(), "backend health check failed");
                Err(ConversionError::BackendUnavailable)
            }
            Err(err) => {
                warn!(url = %url, error = %err, "backend unreachable");
                Err(ConversionError::BackendUnavailable)
            }
        }
    }

    async fn upload(&self, request: ConversionRequest) -> Result<Vec<u8>, ConversionError> {
        let url = self.config.endpoint(CONVERT_PATH);
        let form = build_form(request)?;

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| {
                warn!(url = %url, error = %err, "upload failed");
                ConversionError::network(err)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = ConvertErrorBody::message_from_bytes(&body);
            warn!(url = %url, status = %status, message = %message, "backend rejected conversion");
            return Err(ConversionError::ConversionRejected {
                status: status.as_u16(),
                message,
            });
        }

        let midi = response.bytes().await.map_err(ConversionError::network)?;
        info!(url = %url, size_bytes = midi.len(), "conversion finished");
        Ok(midi.to_vec())
    }
}

fn build_form(request: ConversionRequest) -> Result<Form, ConversionError> {
    let ConversionRequest {
        midi_file_name,
        tempos,
        page_range,
        file,
    } = request;

    let tempos = encode_tempos(&tempos).map_err(ConversionError::network)?;
    let file_part = Part::bytes(file.bytes().to_vec())
        .file_name(file.file_name().to_string())
        .mime_str(&file.mime_type())
        .map_err(ConversionError::network)?;

    let mut form = Form::new()
        .text(FIELD_MIDI_FILE_NAME, midi_file_name)
        .text(FIELD_TEMPOS, tempos)
        .text(FIELD_SHOULD_PARSE_PAGE_RANGE, page_range.is_some().to_string());
    if let Some(range) = page_range {
        form = form
            .text(FIELD_PAGE_RANGE_START, range.start.to_string())
            .text(FIELD_PAGE_RANGE_END, range.end.to_string());
    }
    Ok(form.part(FIELD_FILE, file_part))
}

/// Returns the client to `Idle` if a conversion future is dropped before it
/// reaches a terminal state.
struct InFlight<'a> {
    state: &'a watch::Sender<ConversionState>,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a watch::Sender<ConversionState>) -> Self {
        Self {
            state,
            finished: false,
        }
    }

    fn finish(&mut self, terminal: ConversionState) {
        self.state.send_replace(terminal);
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("conversion dropped before completion");
            self.state.send_replace(ConversionState::Idle);
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
