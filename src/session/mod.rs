//! Creative-session state.
//!
//! A [`Studio`] owns the prompt, the optional attachment and a [`Phase`].
//! The phase is a sum type, so a stale result can never coexist with an
//! in-flight request. Submitting is split into [`Studio::begin_submit`] and
//! [`Studio::complete`] so a front end can render the loading view between
//! the two; [`Studio::submit`] runs both around one orchestrator call.

pub mod attachment;
pub mod download;

use crate::{
    error::{Result, StudioError},
    gemini::ImageClient,
    models::{GeneratedImage, Mode, Prompt, RequestPayload, ResponseResult},
};
use std::path::Path;
use uuid::Uuid;

pub use attachment::{Attachment, PreviewHandle, PreviewRegistry};
pub use download::{save_data_url, save_image};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Composing,
    Processing { mode: Mode },
    Succeeded(GeneratedImage),
    Failed(String),
}

/// What the front end renders. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    Welcome,
    Loading { mode: Mode },
    Result(&'a GeneratedImage),
    Error(&'a str),
}

pub struct Studio {
    id: Uuid,
    prompt: String,
    attachment: Option<Attachment>,
    phase: Phase,
    previews: PreviewRegistry,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}

impl Studio {
    pub fn new() -> Self {
        Self::with_previews(PreviewRegistry::new())
    }

    pub fn with_previews(previews: PreviewRegistry) -> Self {
        let id = Uuid::new_v4();
        log::debug!("Creative session {} created", id);
        Self {
            id,
            prompt: String::new(),
            attachment: None,
            phase: Phase::Idle,
            previews,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.phase, Phase::Processing { .. })
    }

    /// Mode the next submit would use.
    pub fn mode(&self) -> Mode {
        if self.attachment.is_some() {
            Mode::Edit
        } else {
            Mode::Generate
        }
    }

    pub fn placeholder(&self) -> &'static str {
        self.mode().prompt_placeholder()
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_processing() && !self.prompt.trim().is_empty()
    }

    pub fn view(&self) -> View<'_> {
        match &self.phase {
            Phase::Idle | Phase::Composing => View::Welcome,
            Phase::Processing { mode } => View::Loading { mode: *mode },
            Phase::Succeeded(image) => View::Result(image),
            Phase::Failed(message) => View::Error(message),
        }
    }

    pub fn result(&self) -> Option<ResponseResult> {
        match &self.phase {
            Phase::Succeeded(image) => Some(ResponseResult::Image(image.data_url())),
            Phase::Failed(message) => Some(ResponseResult::Failure(message.clone())),
            _ => None,
        }
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.settle();
    }

    /// Stores an image for edit mode, replacing (and revoking) any previous
    /// one. Rejected images leave the attachment untouched and surface the
    /// error view unless a request is in flight.
    pub fn attach(&mut self, bytes: Vec<u8>, mime_type: &str) -> Result<()> {
        let attachment = Attachment::new(bytes, mime_type, &self.previews).map_err(StudioError::from);
        self.store_attachment(attachment)
    }

    pub fn attach_file(&mut self, path: &Path) -> Result<()> {
        let attachment = Attachment::from_file(path, &self.previews);
        self.store_attachment(attachment)
    }

    pub fn clear_attachment(&mut self) {
        if self.attachment.take().is_some() {
            log::debug!("Attachment cleared");
        }
        self.settle();
    }

    /// Starts a request if allowed. Returns `None` when the prompt is blank
    /// or a request is already outstanding.
    pub fn begin_submit(&mut self) -> Option<RequestPayload> {
        if self.is_processing() {
            log::debug!("Submit ignored: request already in flight");
            return None;
        }
        let prompt = Prompt::parse(&self.prompt).ok()?;

        let payload = match &self.attachment {
            Some(attachment) => RequestPayload::Edit {
                prompt,
                image_data: attachment.to_base64(),
                mime_type: attachment.mime_type().to_string(),
            },
            None => RequestPayload::Generate { prompt },
        };

        self.phase = Phase::Processing {
            mode: payload.mode(),
        };
        Some(payload)
    }

    /// Records the outcome of the request started by `begin_submit`.
    /// Returns `None`, leaving the session untouched, when no request is in
    /// flight.
    pub fn complete(&mut self, outcome: Result<GeneratedImage>) -> Option<ResponseResult> {
        if !self.is_processing() {
            log::warn!("⚠️  Outcome arrived with no request in flight; ignored");
            return None;
        }
        let result = ResponseResult::from_outcome(&outcome);

        self.phase = match outcome {
            Ok(image) => {
                log::info!("✅ Session {} received image ({})", self.id, image.mime_type);
                Phase::Succeeded(image)
            }
            Err(err) => {
                log::warn!("Session {} request failed: {}", self.id, err);
                Phase::Failed(err.user_message())
            }
        };
        Some(result)
    }

    pub async fn submit(&mut self, client: &ImageClient) -> Option<ResponseResult> {
        let payload = self.begin_submit()?;
        let outcome = client.dispatch_validated(&payload).await;
        self.complete(outcome)
    }

    fn store_attachment(&mut self, attachment: Result<Attachment>) -> Result<()> {
        match attachment {
            Ok(attachment) => {
                log::debug!(
                    "Attached {} ({} bytes)",
                    attachment.mime_type(),
                    attachment.size()
                );
                self.attachment = Some(attachment);
                self.settle();
                Ok(())
            }
            Err(err) => {
                if !self.is_processing() {
                    self.phase = Phase::Failed(err.user_message());
                }
                Err(err)
            }
        }
    }

    /// Re-derives the phase after an input edit. In-flight requests are
    /// left alone.
    fn settle(&mut self) {
        if self.is_processing() {
            return;
        }
        self.phase = if self.prompt.trim().is_empty() && self.attachment.is_none() {
            Phase::Idle
        } else {
            Phase::Composing
        };
    }
}

impl Drop for Studio {
    fn drop(&mut self) {
        log::debug!("Creative session {} discarded", self.id);
    }
}
