use std::time::Duration;
use url::Url;
use crate::{Error, Result};
use crate::protocol::DEFAULT_CSRF_HEADER;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL every endpoint path is joined onto
    pub base_url: Url,

    /// Anti-forgery token sent on every POST
    pub csrf_token: Option<String>,

    /// Header carrying the anti-forgery token
    pub csrf_header: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// User agent
    pub user_agent: String,
}

impl ServiceConfig {
    /// Create config builder
    pub fn builder(base_url: impl Into<String>) -> ServiceConfigBuilder {
        ServiceConfigBuilder::new(base_url)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.base_url.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::config(format!("Unsupported scheme: {}", scheme))),
        }

        if self.base_url.cannot_be_a_base() {
            return Err(Error::config("Base URL cannot carry relative paths"));
        }

        if self.csrf_header.trim().is_empty() {
            return Err(Error::config("Anti-forgery header name must not be empty"));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::config("Request timeout must be non-zero"));
        }

        Ok(())
    }
}

/// Builder for ServiceConfig
pub struct ServiceConfigBuilder {
    base_url: String,
    csrf_token: Option<String>,
    csrf_header: String,
    request_timeout: Duration,
    user_agent: String,
}

impl ServiceConfigBuilder {
    /// Create new builder
    pub fn new(base_url: impl Into<String>) -> Self {
        ServiceConfigBuilder {
            base_url: base_url.into(),
            csrf_token: None,
            csrf_header: DEFAULT_CSRF_HEADER.to_string(),
            request_timeout: Duration::from_secs(10),
            user_agent: format!("roommatch/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set anti-forgery token
    pub fn csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Set anti-forgery header name
    pub fn csrf_header(mut self, header: impl Into<String>) -> Self {
        self.csrf_header = header.into();
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build configuration
    pub fn build(self) -> Result<ServiceConfig> {
        let mut base_url = Url::parse(&self.base_url)?;

        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let config = ServiceConfig {
            base_url,
            csrf_token: self.csrf_token,
            csrf_header: self.csrf_header,
            request_timeout: self.request_timeout,
            user_agent: self.user_agent,
        };
        config.validate()?;
        Ok(config)
    }
}
