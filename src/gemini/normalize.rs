//! Reply normalization shared by generate and edit.
//!
//! Only the first candidate is inspected. Within it the preference order is
//! fixed: any inline image beats any text, and text only becomes the error
//! message when no image exists anywhere in the reply.

use crate::error::ModelError;
use crate::models::{GenerateContentResponse, GeneratedImage, ReplyPart};

/// A reply part resolved to the one shape that matters for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind<'a> {
    Image {
        data: &'a str,
        mime_type: Option<&'a str>,
    },
    Text(&'a str),
    Other,
}

pub fn classify(part: &ReplyPart) -> PartKind<'_> {
    if let Some(inline) = &part.inline_data {
        if let Some(data) = inline.data.as_deref().filter(|data| !data.is_empty()) {
            return PartKind::Image {
                data,
                mime_type: inline.mime_type.as_deref(),
            };
        }
    }
    match part.text.as_deref() {
        Some(text) if !text.is_empty() => PartKind::Text(text),
        _ => PartKind::Other,
    }
}

pub fn normalize_response(
    response: &GenerateContentResponse,
) -> Result<GeneratedImage, ModelError> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| ModelError::NoCandidates {
            block_reason: response
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.clone()),
        })?;

    let kinds: Vec<PartKind<'_>> = candidate.parts().iter().map(classify).collect();

    let image = kinds.iter().find_map(|kind| match kind {
        PartKind::Image { data, mime_type } => Some(GeneratedImage::new(*data, *mime_type)),
        _ => None,
    });
    if let Some(image) = image {
        return Ok(image);
    }

    let text = kinds.iter().find_map(|kind| match kind {
        PartKind::Text(text) => Some(*text),
        _ => None,
    });
    if let Some(text) = text {
        return Err(ModelError::TextOnly(text.to_string()));
    }

    Err(ModelError::NoImageData {
        finish_reason: candidate.finish_reason.clone(),
    })
}
