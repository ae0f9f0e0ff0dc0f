pub mod backend;
pub mod image_client;
pub mod mock;
pub mod normalize;

use crate::{config::GeminiConfig, error::Result};
use std::sync::Arc;

pub use backend::{HttpBackend, ModelBackend};
pub use image_client::ImageClient;
pub use mock::ScriptedBackend;
pub use normalize::normalize_response;

#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImageClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let backend = HttpBackend::new(&config)?;
        log::debug!("Gemini endpoint: {}", backend.endpoint());
        Ok(Self::with_backend(Arc::new(backend)))
    }

    /// Builds a client over any backend, e.g. [`ScriptedBackend`] in tests.
    pub fn with_backend(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            image_client: ImageClient::new(backend),
        }
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}
