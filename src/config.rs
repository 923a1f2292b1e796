//! Configuration for resume evaluation.
//!
//! All behaviour is controlled through [`EvaluatorConfig`], built via its
//! [`EvaluatorConfigBuilder`] or filled from the process environment with
//! [`EvaluatorConfig::from_env`].

use crate::error::AtsError;
use crate::model::VisionModel;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Model used when neither `--model` nor `ATS_MODEL` is given.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Root of the Gemini REST API.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variable holding the Gemini credential.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Configuration for an evaluation run.
///
/// # Example
/// ```rust
/// use ats_resume_expert::EvaluatorConfig;
///
/// let config = EvaluatorConfig::builder()
///     .api_key("test-key")
///     .jpeg_quality(90)
///     .build()
///     .unwrap();
/// assert_eq!(config.model_id(), "gemini-1.5-flash");
/// ```
#[derive(Clone)]
pub struct EvaluatorConfig {
    /// Model identifier sent to the backend. None means [`DEFAULT_MODEL`]
    /// for Gemini; a named provider requires an explicit model.
    pub model: Option<String>,

    /// edgequake-llm provider name (e.g. "openai", "anthropic", "ollama").
    /// If None, the built-in Gemini backend is used.
    pub provider_name: Option<String>,

    /// Pre-constructed backend. Takes precedence over `provider_name` and the
    /// Gemini default.
    pub backend: Option<Arc<dyn VisionModel>>,

    /// Gemini API key. Required when the Gemini backend is used.
    pub api_key: Option<String>,

    /// Gemini endpoint root. Default: [`DEFAULT_GEMINI_BASE_URL`].
    pub gemini_base_url: String,

    /// Longest edge of the rendered first page, in pixels. Default: 2000.
    pub max_rendered_pixels: u32,

    /// JPEG quality for the preview image (1–100). Default: 85.
    pub jpeg_quality: u8,

    /// PDF user password for encrypted resumes.
    pub password: Option<String>,

    /// Per-call timeout in seconds. None leaves the transport default.
    pub api_timeout_secs: Option<u64>,

    /// Sampling temperature. None leaves the model default.
    pub temperature: Option<f32>,

    /// Directory containing the pdfium shared library.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            backend: None,
            api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            max_rendered_pixels: 2000,
            jpeg_quality: 85,
            password: None,
            api_timeout_secs: None,
            temperature: None,
            pdfium_lib_path: None,
        }
    }
}

impl fmt::Debug for EvaluatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatorConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("backend", &self.backend.as_ref().map(|_| "<dyn VisionModel>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("temperature", &self.temperature)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .finish()
    }
}

impl EvaluatorConfig {
    /// Create a new builder for `EvaluatorConfig`.
    pub fn builder() -> EvaluatorConfigBuilder {
        EvaluatorConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from the process environment.
    ///
    /// Reads `GOOGLE_API_KEY`, `ATS_MODEL`, `ATS_PROVIDER`, `GEMINI_BASE_URL`
    /// and `PDFIUM_LIB_PATH`. Fails fast when the Gemini backend is selected
    /// and no key is present.
    pub fn from_env() -> Result<Self, AtsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AtsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut builder = Self::builder();
        if let Some(model) = get("ATS_MODEL") {
            builder = builder.model(model);
        }
        if let Some(provider) = get("ATS_PROVIDER") {
            builder = builder.provider_name(provider);
        }
        if let Some(key) = get(API_KEY_VAR) {
            builder = builder.api_key(key);
        }
        if let Some(url) = get("GEMINI_BASE_URL") {
            builder = builder.gemini_base_url(url);
        }
        if let Some(dir) = get("PDFIUM_LIB_PATH") {
            builder = builder.pdfium_lib_path(dir);
        }

        let config = builder.build()?;
        config.require_credential()?;
        Ok(config)
    }

    /// Model id in effect for the Gemini backend.
    pub fn model_id(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Whether the built-in Gemini backend will serve requests.
    pub fn uses_gemini(&self) -> bool {
        self.backend.is_none() && self.provider_name.is_none()
    }

    /// Fail with [`AtsError::MissingCredential`] when Gemini is selected
    /// without an API key.
    pub fn require_credential(&self) -> Result<(), AtsError> {
        let missing = self
            .api_key
            .as_deref()
            .map(|k| k.trim().is_empty())
            .unwrap_or(true);
        if self.uses_gemini() && missing {
            return Err(AtsError::MissingCredential {
                var: API_KEY_VAR.to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`EvaluatorConfig`].
pub struct EvaluatorConfigBuilder {
    config: EvaluatorConfig,
}

impl EvaluatorConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn VisionModel>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gemini_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn pdfium_lib_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<EvaluatorConfig, AtsError> {
        let c = &self.config;
        if c.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(AtsError::InvalidConfig("model id must not be empty".into()));
        }
        if c.provider_name.is_some() && c.backend.is_none() && c.model.is_none() {
            return Err(AtsError::InvalidConfig(
                "a model id is required when a provider is named".into(),
            ));
        }
        if !(c.gemini_base_url.starts_with("http://") || c.gemini_base_url.starts_with("https://"))
        {
            return Err(AtsError::InvalidConfig(format!(
                "Gemini base URL must be http(s), got '{}'",
                c.gemini_base_url
            )));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(AtsError::InvalidConfig("API timeout must be ≥ 1s".into()));
        }
        Ok(self.config)
    }
}
