use thiserror::Error;

/// Local input problems. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Image too large (max 5MB)")]
    AttachmentTooLarge { size: u64, limit: u64 },

    #[error("Unsupported image type: {0}")]
    UnsupportedMimeType(String),

    #[error("Invalid image data: {0}")]
    InvalidImageData(String),
}

/// Reply shapes that carry no usable image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("no candidates returned by model{}", reason_suffix("blocked", .block_reason))]
    NoCandidates { block_reason: Option<String> },

    #[error("model returned text instead of image: {0}")]
    TextOnly(String),

    #[error("no image data found in the response{}", reason_suffix("finish reason", .finish_reason))]
    NoImageData { finish_reason: Option<String> },
}

fn reason_suffix(label: &str, reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(" ({}: {})", label, reason),
        None => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Logger error: {0}")]
    Logger(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StudioError {
    /// True for errors raised before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, StudioError::Validation(_))
    }

    /// Text shown to the user in the error view.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            "Something went wrong. Try a different prompt.".to_string()
        } else {
            message
        }
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        StudioError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_messages() {
        let refusal = ModelError::TextOnly("I cannot do that".into());
        assert!(refusal.to_string().contains("I cannot do that"));

        let empty = ModelError::NoCandidates { block_reason: None };
        assert_eq!(empty.to_string(), "no candidates returned by model");

        let blocked = ModelError::NoCandidates {
            block_reason: Some("SAFETY".into()),
        };
        assert_eq!(
            blocked.to_string(),
            "no candidates returned by model (blocked: SAFETY)"
        );

        let nothing = ModelError::NoImageData {
            finish_reason: Some("STOP".into()),
        };
        assert_eq!(
            nothing.to_string(),
            "no image data found in the response (finish reason: STOP)"
        );
    }

    #[test]
    fn test_studio_error_passes_model_message_through() {
        let err: StudioError = ModelError::TextOnly("nope".into()).into();
        assert_eq!(err.user_message(), "model returned text instead of image: nope");
        assert!(!err.is_validation());

        let err: StudioError = ValidationError::EmptyPrompt.into();
        assert!(err.is_validation());
    }
}
