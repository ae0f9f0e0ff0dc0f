//! Wire types for the Gemini `generateContent` endpoint.
//!
//! Requests are built from the strongly typed [`Part`] enum. Replies are
//! decoded leniently into [`ReplyPart`] so that part shapes this crate does
//! not know about survive decoding and fall through to the "neither image
//! nor text" case during normalization.

use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// One request part. Variant order matters for untagged decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn inline_image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContent {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
}

impl GenerateContentRequest {
    pub fn from_parts(parts: Vec<Part>) -> Self {
        GenerateContentRequest {
            contents: vec![RequestContent { parts }],
        }
    }

    /// All parts across every content entry, in order.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.contents.iter().flat_map(|content| content.parts.iter())
    }
}

/// Inline payload as it appears in a reply; both fields may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyInlineData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<ReplyInlineData>,
}

impl ReplyPart {
    pub fn text(text: impl Into<String>) -> Self {
        ReplyPart {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn image(data: impl Into<String>, mime_type: Option<&str>) -> Self {
        ReplyPart {
            text: None,
            inline_data: Some(ReplyInlineData {
                mime_type: mime_type.map(String::from),
                data: Some(data.into()),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub parts: Vec<ReplyPart>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ReplyContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl Candidate {
    pub fn with_parts(parts: Vec<ReplyPart>) -> Self {
        Candidate {
            content: Some(ReplyContent { parts }),
            finish_reason: None,
        }
    }

    pub fn parts(&self) -> &[ReplyPart] {
        self.content
            .as_ref()
            .map(|content| content.parts.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    pub fn with_candidates(candidates: Vec<Candidate>) -> Self {
        GenerateContentResponse {
            candidates,
            prompt_feedback: None,
        }
    }
}

/// Error envelope returned by the API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edit_request_wire_shape() {
        let request = GenerateContentRequest::from_parts(vec![
            Part::inline_image("BBBB", "image/jpeg"),
            Part::text("make it blue"),
        ]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "parts": [
                        { "inlineData": { "mimeType": "image/jpeg", "data": "BBBB" } },
                        { "text": "make it blue" }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_reply_tolerates_unknown_parts() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "functionCall": { "name": "noop", "args": {} } },
                        { "inlineData": { "data": "AAAA" } }
                    ]
                },
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": { "totalTokenCount": 12 }
        });
        let reply: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let parts = reply.candidates[0].parts();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], ReplyPart::default());
        assert_eq!(
            parts[1].inline_data.as_ref().and_then(|d| d.data.as_deref()),
            Some("AAAA")
        );
        assert_eq!(reply.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_explicit_nulls_decode_as_empty() {
        let reply: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":null}"#).unwrap();
        assert!(reply.candidates.is_empty());

        let raw = json!({ "candidates": [{ "content": { "parts": null }, "finishReason": "STOP" }] });
        let reply: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert!(reply.candidates[0].parts().is_empty());
    }

    #[test]
    fn test_reply_without_candidates_decodes() {
        let raw = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let reply: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert!(reply.candidates.is_empty());
        assert_eq!(
            reply.prompt_feedback.and_then(|f| f.block_reason).as_deref(),
            Some("SAFETY")
        );
    }
}
