//! Public configuration for the `ElevenLabs` client.

use std::time::Duration;

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

/// MP3 at 44.1 kHz / 128 kbps, what browsers and `mpg123` play directly.
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Configuration for the `ElevenLabs` client.
///
/// Use the builder pattern methods to customize the client configuration.
///
/// # Example
///
/// ```
/// use mentorchat_elevenlabs::ElevenLabsConfig;
/// use std::time::Duration;
///
/// let config = ElevenLabsConfig::new()
///     .with_optional_api_key(std::env::var("ELEVENLABS_API_KEY").ok())
///     .with_timeout(Duration::from_secs(90));
/// ```
#[derive(Clone)]
pub struct ElevenLabsConfig {
    /// API host, without the `/v1` path
    pub(crate) base_url: String,
    /// Sent as `xi-api-key`
    pub(crate) api_key: Option<String>,
    /// `output_format` query parameter
    pub(crate) output_format: String,
    pub(crate) user_agent: String,
    /// Total request timeout, including reading the audio body
    pub(crate) timeout: Duration,
    pub(crate) connect_timeout: Duration,
}

// Keeps the key out of logs.
impl std::fmt::Debug for ElevenLabsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("output_format", &self.output_format)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            user_agent: concat!("mentorchat-elevenlabs/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ElevenLabsConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API host. Defaults to `https://api.elevenlabs.io`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set an optional API key. Blank keys are treated as absent.
    #[must_use]
    pub fn with_optional_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout. Defaults to 60 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Whether an API key is present.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ElevenLabsConfig::new();
        assert_eq!(config.base_url, "https://api.elevenlabs.io");
        assert_eq!(config.output_format, "mp3_44100_128");
        assert!(config.user_agent.starts_with("mentorchat-elevenlabs/"));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ElevenLabsConfig::new()
            .with_base_url("http://localhost:9000")
            .with_api_key("sk-test")
            .with_output_format("mp3_22050_32")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.output_format, "mp3_22050_32");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_optional_key_is_absent() {
        assert!(!ElevenLabsConfig::new().with_optional_api_key(Some("  ".into())).has_api_key());
        assert!(!ElevenLabsConfig::new().with_optional_api_key(None).has_api_key());
        assert!(ElevenLabsConfig::new().with_optional_api_key(Some("k".into())).has_api_key());
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", ElevenLabsConfig::new().with_api_key("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
