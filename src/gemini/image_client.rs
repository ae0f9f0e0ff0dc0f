use crate::{
    config::MAX_ATTACHMENT_BYTES,
    error::{Result, ValidationError},
    gemini::{backend::ModelBackend, normalize::normalize_response},
    logger,
    models::{GeneratedImage, ModelInfo, Prompt, RequestPayload},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

/// Turns a prompt, optionally with an image, into exactly one model call
/// and a normalized result. Holds no state between calls.
#[derive(Clone)]
pub struct ImageClient {
    backend: Arc<dyn ModelBackend>,
}

impl ImageClient {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        [
            (
                "gemini-2.5-flash-image",
                "Gemini 2.5 Flash Image",
                "Fast image generation and editing",
            ),
            (
                "gemini-2.5-flash-image-preview",
                "Gemini 2.5 Flash Image (preview)",
                "Preview release of the flash image model",
            ),
            (
                "gemini-3-pro-image-preview",
                "Gemini 3 Pro Image (preview)",
                "Higher fidelity output, slower",
            ),
        ]
        .into_iter()
        .map(|(id, name, description)| ModelInfo {
            id: id.to_string(),
            name: name.to_string(),
            provider: "Google".to_string(),
            description: description.to_string(),
        })
        .collect()
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    pub async fn generate(&self, prompt: &Prompt) -> Result<GeneratedImage> {
        self.invoke(&RequestPayload::Generate {
            prompt: prompt.clone(),
        })
        .await
    }

    pub async fn edit(
        &self,
        image_data: &str,
        mime_type: &str,
        prompt: &Prompt,
    ) -> Result<GeneratedImage> {
        validate_edit_inputs(image_data, mime_type)?;
        self.invoke(&RequestPayload::Edit {
            prompt: prompt.clone(),
            image_data: image_data.to_string(),
            mime_type: mime_type.to_string(),
        })
        .await
    }

    pub async fn dispatch(&self, payload: &RequestPayload) -> Result<GeneratedImage> {
        match payload {
            RequestPayload::Generate { prompt } => self.generate(prompt).await,
            RequestPayload::Edit {
                prompt,
                image_data,
                mime_type,
            } => self.edit(image_data, mime_type, prompt).await,
        }
    }

    /// Sends a payload whose image already passed attachment validation,
    /// skipping the base64 round trip `edit` does on untrusted input.
    pub(crate) async fn dispatch_validated(
        &self,
        payload: &RequestPayload,
    ) -> Result<GeneratedImage> {
        self.invoke(payload).await
    }

    async fn invoke(&self, payload: &RequestPayload) -> Result<GeneratedImage> {
        let mode = payload.mode();
        let request = payload.to_request();

        log::info!("🎨 {} with model: {}", mode.progress_label(), self.backend.model());
        log::debug!("Prompt: {}", payload.prompt());

        let response = {
            let _timer = logger::timer(&format!("{} generateContent", mode));
            self.backend.generate_content(&request).await
        };

        let response = response.map_err(|e| {
            log::error!("❌ {} request failed: {}", mode, e);
            e
        })?;

        normalize_response(&response).map_err(|e| {
            log::warn!("⚠️  {} reply carried no image: {}", mode, e);
            e.into()
        })
    }
}

/// Checks edit inputs locally so that bad input never reaches the network.
pub fn validate_edit_inputs(
    image_data: &str,
    mime_type: &str,
) -> std::result::Result<(), ValidationError> {
    validate_image_mime_type(mime_type)?;

    let bytes = STANDARD
        .decode(image_data.as_bytes())
        .map_err(|e| ValidationError::InvalidImageData(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ValidationError::InvalidImageData("image is empty".into()));
    }
    check_attachment_size(bytes.len() as u64)
}

pub fn validate_image_mime_type(mime_type: &str) -> std::result::Result<(), ValidationError> {
    let mime = mime_type.trim().to_ascii_lowercase();
    match mime.strip_prefix("image/") {
        Some(subtype) if !subtype.is_empty() => Ok(()),
        _ => Err(ValidationError::UnsupportedMimeType(mime_type.to_string())),
    }
}

pub fn check_attachment_size(size: u64) -> std::result::Result<(), ValidationError> {
    if size > MAX_ATTACHMENT_BYTES {
        return Err(ValidationError::AttachmentTooLarge {
            size,
            limit: MAX_ATTACHMENT_BYTES,
        });
    }
    Ok(())
}
