use crate::error::{Result, StudioError, ValidationError};
use crate::models::{GenerateContentRequest, Mode, Part};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_REPLY_MIME_TYPE: &str = "image/png";

/// A prompt that is non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Prompt(String);

impl Prompt {
    pub fn parse(raw: &str) -> std::result::Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyPrompt);
        }
        Ok(Prompt(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Prompt {
    type Error = ValidationError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Prompt::parse(&value)
    }
}

impl From<Prompt> for String {
    fn from(prompt: Prompt) -> Self {
        prompt.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What one submit sends, built fresh per action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPayload {
    Generate {
        prompt: Prompt,
    },
    Edit {
        prompt: Prompt,
        image_data: String,
        mime_type: String,
    },
}

impl RequestPayload {
    pub fn mode(&self) -> Mode {
        match self {
            RequestPayload::Generate { .. } => Mode::Generate,
            RequestPayload::Edit { .. } => Mode::Edit,
        }
    }

    pub fn prompt(&self) -> &Prompt {
        match self {
            RequestPayload::Generate { prompt } | RequestPayload::Edit { prompt, .. } => prompt,
        }
    }

    /// Lowers to the wire request. Edit puts the image before the instruction.
    pub fn to_request(&self) -> GenerateContentRequest {
        let parts = match self {
            RequestPayload::Generate { prompt } => vec![Part::text(prompt.as_str())],
            RequestPayload::Edit {
                prompt,
                image_data,
                mime_type,
            } => vec![
                Part::inline_image(image_data.as_str(), mime_type.as_str()),
                Part::text(prompt.as_str()),
            ],
        };
        GenerateContentRequest::from_parts(parts)
    }
}

/// A normalized image reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub mime_type: String,
    /// Base64 encoded
    pub data: String,
}

impl GeneratedImage {
    pub fn new(data: impl Into<String>, mime_type: Option<&str>) -> Self {
        let mime_type = mime_type
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_REPLY_MIME_TYPE);
        GeneratedImage {
            mime_type: mime_type.to_string(),
            data: data.into(),
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| StudioError::InvalidDataUrl(e.to_string()))
    }

    /// Parses a `data:<mime>;base64,<data>` URL.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| StudioError::InvalidDataUrl("missing data: scheme".into()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| StudioError::InvalidDataUrl("missing payload separator".into()))?;
        let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
            StudioError::InvalidDataUrl("only base64 data URLs are supported".into())
        })?;
        Ok(GeneratedImage::new(data, Some(mime_type)))
    }
}

/// Tagged outcome of one submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ResponseResult {
    Image(String),
    Failure(String),
}

impl ResponseResult {
    pub fn from_outcome(outcome: &Result<GeneratedImage>) -> Self {
        match outcome {
            Ok(image) => ResponseResult::Image(image.data_url()),
            Err(err) => ResponseResult::Failure(err.user_message()),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ResponseResult::Image(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_trimmed_and_non_empty() {
        assert_eq!(Prompt::parse("  a red balloon \n").unwrap().as_str(), "a red balloon");
        assert_eq!(Prompt::parse("   \t"), Err(ValidationError::EmptyPrompt));
        assert_eq!(Prompt::parse(""), Err(ValidationError::EmptyPrompt));
    }

    #[test]
    fn test_generate_payload_is_text_only() {
        let payload = RequestPayload::Generate {
            prompt: Prompt::parse("a red balloon").unwrap(),
        };
        let request = payload.to_request();
        let parts: Vec<_> = request.parts().collect();
        assert_eq!(parts, vec![&Part::text("a red balloon")]);
        assert_eq!(payload.mode(), Mode::Generate);
    }

    #[test]
    fn test_data_url_defaults_to_png() {
        let image = GeneratedImage::new("AAAA", None);
        assert_eq!(image.data_url(), "data:image/png;base64,AAAA");

        let image = GeneratedImage::new("AAAA", Some(""));
        assert_eq!(image.mime_type, "image/png");

        let image = GeneratedImage::new("AAAA", Some("image/webp"));
        assert_eq!(image.data_url(), "data:image/webp;base64,AAAA");
    }

    #[test]
    fn test_data_url_parse() {
        let image = GeneratedImage::from_data_url("data:image/jpeg;base64,QUJD").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.decode_bytes().unwrap(), b"ABC");

        assert!(GeneratedImage::from_data_url("https://example.com/a.png").is_err());
        assert!(GeneratedImage::from_data_url("data:text/plain,hello").is_err());
    }
}
