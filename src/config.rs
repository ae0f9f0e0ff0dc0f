use std::env;
use std::path::PathBuf;

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_DOWNLOAD_PREFIX: &str = "i59";

/// Hard cap on attachment size, inclusive.
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: DEFAULT_IMAGE_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    ///
    /// The API key is read from `GEMINI_API_KEY`, then `API_KEY`, then
    /// `GOOGLE_API_KEY`; blank values are skipped.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .or_else(|| non_empty("GOOGLE_API_KEY"));
        let model = non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());
        let api_base = non_empty("GEMINI_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        GeminiConfig {
            api_key,
            model,
            api_base,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub gemini: GeminiConfig,
    pub download_dir: PathBuf,
    pub download_prefix: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            gemini: GeminiConfig::default(),
            download_dir: PathBuf::from("."),
            download_prefix: DEFAULT_DOWNLOAD_PREFIX.to_string(),
        }
    }
}

impl StudioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini = GeminiConfig::from_lookup(&lookup);
        let download_dir = lookup("STUDIO_DOWNLOAD_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let download_prefix = lookup("STUDIO_DOWNLOAD_PREFIX")
            .map(|prefix| prefix.trim().to_string())
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_PREFIX.to_string());

        StudioConfig {
            gemini,
            download_dir,
            download_prefix,
        }
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_download_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.download_prefix = prefix.into();
        self
    }
}
