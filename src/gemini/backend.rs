use crate::{
    config::GeminiConfig,
    error::{Result, StudioError},
    models::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse},
};
use async_trait::async_trait;

/// One round trip to the image model. Implementations must not retry.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    fn model(&self) -> &str;

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}

/// `generateContent` over HTTPS.
///
/// No request timeout is configured; a call resolves or fails only when the
/// transport does.
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl HttpBackend {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                StudioError::Config(
                    "GEMINI_API_KEY (or API_KEY / GOOGLE_API_KEY) is not set".into(),
                )
            })?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StudioError::Config(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        endpoint_for_model(&self.api_base, &self.model)
    }
}

pub fn endpoint_for_model(api_base: &str, model: &str) -> String {
    let trimmed = model.trim();
    let model_path = if trimmed.starts_with("models/") {
        trimmed.to_string()
    } else {
        format!("models/{}", trimmed)
    };
    format!("{}/{}:generateContent", api_base, model_path)
}

/// Maps a non-2xx body to an error, keeping the upstream message.
pub fn api_error(status: u16, body: &str) -> StudioError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            let raw = body.trim();
            if raw.is_empty() {
                format!("HTTP {}", status)
            } else {
                raw.to_string()
            }
        });
    StudioError::Api { status, message }
}

#[async_trait]
impl ModelBackend for HttpBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let endpoint = self.endpoint();
        log::debug!("POST {}", endpoint);

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Gemini transport error details: {:?}", e);
                StudioError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StudioError::Transport(e.to_string()))?;

        if !status.is_success() {
            log::error!("Gemini returned HTTP {}", status.as_u16());
            return Err(api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| StudioError::Transport(format!("malformed response payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::gemini::normalize_response;
    use crate::models::Part;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|len| len.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Answers a single request with `status` and `body`, handing back the
    /// raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            let _ = tx.send(request);
        });
        (format!("http://{}/v1beta", addr), rx)
    }

    fn backend(api_base: &str) -> HttpBackend {
        let config = GeminiConfig::new()
            .with_api_key("secret-key")
            .with_model("test-image-model")
            .with_api_base(api_base);
        HttpBackend::new(&config).unwrap()
    }

    fn generate_request() -> GenerateContentRequest {
        GenerateContentRequest::from_parts(vec![Part::text("a red balloon")])
    }

    #[tokio::test]
    async fn test_posts_to_model_endpoint_with_key_header() {
        let body = r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AAAA"}}]}}]}"#;
        let (base, request_rx) = serve_once("200 OK", body).await;

        let response = backend(&base)
            .generate_content(&generate_request())
            .await
            .unwrap();
        assert_eq!(
            normalize_response(&response).unwrap().data_url(),
            "data:image/png;base64,AAAA"
        );

        let request = request_rx.await.unwrap();
        let lowered = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /v1beta/models/test-image-model:generateContent "));
        assert!(lowered.contains("x-goog-api-key: secret-key"));
        assert!(request.contains(r#"{"contents":[{"parts":[{"text":"a red balloon"}]}]}"#));
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_api_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        let (base, _request_rx) = serve_once("400 Bad Request", body).await;

        match backend(&base).generate_content(&generate_request()).await {
            Err(StudioError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_transport_error() {
        let (base, _request_rx) = serve_once("200 OK", "<html>gateway</html>").await;

        match backend(&base).generate_content(&generate_request()).await {
            Err(StudioError::Transport(message)) => {
                assert!(message.starts_with("malformed response payload"))
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_null_candidates_reach_normalization() {
        let (base, _request_rx) = serve_once("200 OK", r#"{"candidates":null}"#).await;

        let response = backend(&base)
            .generate_content(&generate_request())
            .await
            .unwrap();
        assert_eq!(
            normalize_response(&response).unwrap_err(),
            ModelError::NoCandidates { block_reason: None }
        );
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = backend(&format!("http://{}/v1beta", addr))
            .generate_content(&generate_request())
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::Transport(ref message) if !message.is_empty()));
    }

    #[test]
    fn test_endpoint_for_model() {
        assert_eq!(
            endpoint_for_model("https://api.test/v1beta", "gemini-2.5-flash-image"),
            "https://api.test/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
        assert_eq!(
            endpoint_for_model("https://api.test/v1beta", " models/custom "),
            "https://api.test/v1beta/models/custom:generateContent"
        );
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = HttpBackend::new(&GeminiConfig::new()).err().unwrap();
        assert!(matches!(err, StudioError::Config(_)));

        let err = HttpBackend::new(&GeminiConfig::new().with_api_key("   ")).err().unwrap();
        assert!(matches!(err, StudioError::Config(_)));
    }

    #[test]
    fn test_backend_uses_configured_model() {
        let config = GeminiConfig::new()
            .with_api_key("secret")
            .with_model("gemini-3-pro-image-preview")
            .with_api_base("http://localhost:9/v1beta/");
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.model(), "gemini-3-pro-image-preview");
        assert_eq!(
            backend.endpoint(),
            "http://localhost:9/v1beta/models/gemini-3-pro-image-preview:generateContent"
        );
    }

    #[test]
    fn test_api_error_prefers_upstream_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        match api_error(400, body) {
            StudioError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match api_error(502, "Bad Gateway") {
            StudioError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {other:?}"),
        }

        match api_error(503, "") {
            StudioError::Api { message, .. } => assert_eq!(message, "HTTP 503"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
