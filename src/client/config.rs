//! Client configuration options.

use std::time::Duration;

use url::Url;

use crate::{Environment, Error, Result};

/// Configuration for the Mondo client.
///
/// # Example
///
/// ```
/// use mondo_rs::{ClientConfig, Environment};
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_environment(Environment::Staging)
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-app/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API environment to talk to
    pub environment: Environment,
    /// Base URL overriding the environment's, e.g. for a local mock server
    pub base_url: Option<Url>,
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header value; `None` sends no user agent
    pub user_agent: Option<String>,
    /// Host every request is sent to, regardless of its URL
    pub host: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: None,
            timeout: Duration::from_secs(30),
            user_agent: Some(format!("mondo-rs/{} (Rust)", env!("CARGO_PKG_VERSION"))),
            host: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Use a custom base URL instead of the environment's.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let mut url = Url::parse(base_url)?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!("Invalid base URL: {}", base_url)));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        Ok(self)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Send requests without a User-Agent header.
    pub fn without_user_agent(mut self) -> Self {
        self.user_agent = None;
        self
    }

    /// Send every request to `host`, keeping scheme, path and query.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// The base URL endpoints are resolved against. Always ends with `/`.
    pub fn base_url(&self) -> Result<Url> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Ok(Url::parse(self.environment.api_base_url())?),
        }
    }
}
