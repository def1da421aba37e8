//! Endpoint configuration.
//!
//! [`ApiConfig`] collects the knobs an endpoint is constructed with, using
//! the builder pattern for ergonomic construction.
//!
//! # Example
//!
//! ```
//! use terrace_core::ApiConfig;
//!
//! let config = ApiConfig::builder()
//!     .url_prefix("api/v1/")
//!     .debug(true)
//!     .build();
//!
//! assert_eq!(config.url_prefix(), "api/v1/");
//! assert!(config.debug());
//! ```

/// Default content type assumed when no resolver identifies one explicitly.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Configuration for a resource API endpoint.
///
/// Use [`ApiConfig::builder()`] to construct instances.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Whether the process runs in debug/development mode.
    debug: bool,

    /// Fallback content type used by the default resolvers.
    default_content_type: String,

    /// Prefix prepended to every generated URL path (e.g. `"api/v1/"`).
    url_prefix: String,
}

impl ApiConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ApiConfigBuilder {
        ApiConfigBuilder::new()
    }

    /// Returns whether debug mode is enabled.
    ///
    /// In debug mode unhandled errors carry developer detail, and when the
    /// response content type was silently assumed (not an explicit client
    /// choice) the raw error propagates to the host instead of being masked.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Returns the fallback content type.
    #[must_use]
    pub fn default_content_type(&self) -> &str {
        &self.default_content_type
    }

    /// Returns the URL prefix.
    #[must_use]
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ApiConfig`].
#[derive(Debug, Clone)]
pub struct ApiConfigBuilder {
    debug: bool,
    default_content_type: String,
    url_prefix: String,
}

impl ApiConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            debug: false,
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            url_prefix: String::new(),
        }
    }

    /// Enables or disables debug mode.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the fallback content type.
    #[must_use]
    pub fn default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    /// Sets the URL prefix prepended to every generated path.
    #[must_use]
    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ApiConfig {
        ApiConfig {
            debug: self.debug,
            default_content_type: self.default_content_type,
            url_prefix: self.url_prefix,
        }
    }
}

impl Default for ApiConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
