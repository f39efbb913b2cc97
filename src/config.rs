//! Configuration types for background removal API calls

use crate::error::{BgRemovalError, Result};
use crate::services::io::{FileSystem, LocalFileSystem};
use reqwest::header::HeaderValue;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Base endpoint used when none is configured
pub const DEFAULT_BASE_URL: &str = "https://api.bgremove.dev/v1";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Header carrying the API key on every request
pub const API_KEY_HEADER: &str = "x-api-key";

/// Output image format requested from the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    Png,
    /// JPEG (no transparency)
    Jpg,
    /// WebP with alpha channel transparency
    Webp,
}

impl OutputFormat {
    /// Value sent in the `format` form field
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Webp => "webp",
        }
    }
}

/// Channel layout of the output image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMode {
    /// Keep the alpha channel
    Rgba,
    /// Flatten onto a background color
    Rgb,
}

impl ChannelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rgba => "rgba",
            Self::Rgb => "rgb",
        }
    }
}

/// Output resolution preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreset {
    Full,
    Preview,
    Small,
    Medium,
    Large,
}

impl SizePreset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Preview => "preview",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

macro_rules! wire_enum_text {
    ($ty:ty, $what:literal, [$($variant:ident),+]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = BgRemovalError;

            fn from_str(s: &str) -> Result<Self> {
                let lowered = s.trim().to_ascii_lowercase();
                $(
                    if lowered == Self::$variant.as_str() {
                        return Ok(Self::$variant);
                    }
                )+
                Err(BgRemovalError::invalid_config(format!(
                    "Unknown {}: '{}'",
                    $what, s
                )))
            }
        }
    };
}

wire_enum_text!(OutputFormat, "output format", [Png, Jpg, Webp]);
wire_enum_text!(ChannelMode, "channel mode", [Rgba, Rgb]);
wire_enum_text!(SizePreset, "size preset", [Full, Preview, Small, Medium, Large]);

/// Optional processing parameters for a removal request.
///
/// Unset fields are left out of the request so the service defaults apply.
/// Values are validated by the service, not locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingOptions {
    /// Output format (`format`)
    pub format: Option<OutputFormat>,
    /// Output channels (`channels`)
    pub channels: Option<ChannelMode>,
    /// Background color, only meaningful with [`ChannelMode::Rgb`] (`bg_color`)
    pub bg_color: Option<String>,
    /// Output size preset (`size`)
    pub size: Option<SizePreset>,
    /// Crop the result to the subject (`crop`)
    pub crop: Option<bool>,
}

impl ProcessingOptions {
    /// Create a new options builder
    #[must_use]
    pub fn builder() -> ProcessingOptionsBuilder {
        ProcessingOptionsBuilder::default()
    }

    /// Form fields for the options that are set, in a stable order
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(format) = self.format {
            fields.push(("format", format.as_str().to_string()));
        }
        if let Some(channels) = self.channels {
            fields.push(("channels", channels.as_str().to_string()));
        }
        if let Some(bg_color) = &self.bg_color {
            fields.push(("bg_color", bg_color.clone()));
        }
        if let Some(size) = self.size {
            fields.push(("size", size.as_str().to_string()));
        }
        if let Some(crop) = self.crop {
            fields.push(("crop", crop.to_string()));
        }
        fields
    }
}

/// Builder for [`ProcessingOptions`]
#[derive(Debug, Clone, Default)]
pub struct ProcessingOptionsBuilder {
    options: ProcessingOptions,
}

impl ProcessingOptionsBuilder {
    #[must_use]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.options.format = Some(format);
        self
    }

    #[must_use]
    pub fn channels(mut self, channels: ChannelMode) -> Self {
        self.options.channels = Some(channels);
        self
    }

    /// Background color such as `#ffffff` or `white`
    #[must_use]
    pub fn bg_color<S: Into<String>>(mut self, color: S) -> Self {
        self.options.bg_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn size(mut self, size: SizePreset) -> Self {
        self.options.size = Some(size);
        self
    }

    #[must_use]
    pub fn crop(mut self, crop: bool) -> Self {
        self.options.crop = Some(crop);
        self
    }

    #[must_use]
    pub fn build(self) -> ProcessingOptions {
        self.options
    }
}

/// Client configuration: credential, endpoint, timeout and host capabilities.
///
/// Immutable once built and shared read-only by every call of a client.
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    filesystem: Option<Arc<dyn FileSystem>>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("filesystem", &self.filesystem.as_ref().map(|_| "Some(...)"))
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration with default endpoint and timeout
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Create a new configuration builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bgremove_api::ClientConfig;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::builder("sk_test_123")
    ///     .base_url("https://staging.example.com/v1/")
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.base_url(), "https://staging.example.com/v1");
    /// ```
    #[must_use]
    pub fn builder<S: Into<String>>(api_key: S) -> ClientConfigBuilder {
        ClientConfigBuilder::new(api_key)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base endpoint without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Filesystem capability used for path inputs, `None` on hosts without one
    pub fn filesystem(&self) -> Option<Arc<dyn FileSystem>> {
        self.filesystem.clone()
    }

    /// Full URL for an endpoint path such as `remove`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Builder for [`ClientConfig`]
pub struct ClientConfigBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    filesystem: Option<Arc<dyn FileSystem>>,
}

impl ClientConfigBuilder {
    /// Create a new builder with default values
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("bgremove-api/", env!("CARGO_PKG_VERSION")).to_string(),
            filesystem: Some(Arc::new(LocalFileSystem)),
        }
    }

    /// Override the base endpoint (trailing slashes are stripped)
    #[must_use]
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Per-request timeout covering the whole exchange
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Substitute the filesystem used to read path inputs
    #[must_use]
    pub fn filesystem(mut self, filesystem: Arc<dyn FileSystem>) -> Self {
        self.filesystem = Some(filesystem);
        self
    }

    /// Declare a host without filesystem access; path inputs then fail fast
    #[must_use]
    pub fn without_filesystem(mut self) -> Self {
        self.filesystem = None;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// - Empty or whitespace-only API key
    /// - API key or user agent that is not a valid header value
    /// - Empty or unparseable base URL, or one without an http(s) scheme
    /// - Zero timeout
    pub fn build(self) -> Result<ClientConfig> {
        if self.api_key.trim().is_empty() {
            return Err(BgRemovalError::invalid_config("API key must not be empty"));
        }
        if HeaderValue::from_str(&self.api_key).is_err() {
            return Err(BgRemovalError::invalid_config(
                "API key contains characters not allowed in a header (trailing newline?)",
            ));
        }
        if HeaderValue::from_str(&self.user_agent).is_err() {
            return Err(BgRemovalError::invalid_config(format!(
                "User agent '{}' is not a valid header value",
                self.user_agent.escape_debug()
            )));
        }

        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(BgRemovalError::invalid_config("Base URL must not be empty"));
        }
        match Url::parse(&base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {},
            Ok(url) => {
                return Err(BgRemovalError::invalid_config(format!(
                    "Base URL '{}' must use http or https, not '{}'",
                    base_url,
                    url.scheme()
                )));
            },
            Err(e) => {
                return Err(BgRemovalError::invalid_config(format!(
                    "Base URL '{}' is not a valid URL: {}",
                    base_url, e
                )));
            },
        }

        if self.timeout.is_zero() {
            return Err(BgRemovalError::invalid_config(
                "Timeout must be greater than zero",
            ));
        }

        Ok(ClientConfig {
            api_key: self.api_key,
            base_url,
            timeout: self.timeout,
            user_agent: self.user_agent,
            filesystem: self.filesystem,
        })
    }
}
