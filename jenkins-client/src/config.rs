//! Client configuration
//!
//! Connection settings read once when the client is built. Nothing here changes
//! afterwards.

use std::time::Duration;

use jenkins_core::dto::build::DEFAULT_LOG_POLL_DELAY_MS;

use crate::crumb::CrumbIssuer;

/// Jenkins client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Headers sent with every request
    pub headers: Vec<(String, String)>,

    /// How CSRF crumbs are obtained for mutating requests
    pub crumb_issuer: CrumbIssuer,

    /// Basic-auth user
    pub username: Option<String>,

    /// Basic-auth API token or password
    pub api_token: Option<String>,

    /// Per-request timeout applied by the transport
    pub timeout: Option<Duration>,

    /// Default delay between log stream polls
    pub log_poll_delay: Duration,
}

impl ClientConfig {
    /// Creates a new configuration with defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers: Vec::new(),
            crumb_issuer: CrumbIssuer::Disabled,
            username: None,
            api_token: None,
            timeout: None,
            log_poll_delay: Duration::from_millis(DEFAULT_LOG_POLL_DELAY_MS),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JENKINS_URL (required)
    /// - JENKINS_USER (optional)
    /// - JENKINS_API_TOKEN (optional)
    /// - JENKINS_CRUMB_ISSUER (optional, "true" or "1" enables server crumbs)
    /// - JENKINS_TIMEOUT (optional, seconds)
    /// - JENKINS_LOG_POLL_MS (optional, milliseconds, default: 1000)
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = std::env::var("JENKINS_URL")
            .map_err(|_| anyhow::anyhow!("JENKINS_URL environment variable not set"))?;

        let mut config = Self::new(base_url);

        config.username = std::env::var("JENKINS_USER").ok();
        config.api_token = std::env::var("JENKINS_API_TOKEN").ok();

        if std::env::var("JENKINS_CRUMB_ISSUER")
            .map(|value| matches!(value.as_str(), "true" | "1"))
            .unwrap_or(false)
        {
            config.crumb_issuer = CrumbIssuer::Server;
        }

        config.timeout = std::env::var("JENKINS_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        if let Some(delay) = std::env::var("JENKINS_LOG_POLL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.log_poll_delay = Duration::from_millis(delay);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_crumb_issuer(mut self, crumb_issuer: CrumbIssuer) -> Self {
        self.crumb_issuer = crumb_issuer;
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.api_token = Some(api_token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_log_poll_delay(mut self, delay: Duration) -> Self {
        self.log_poll_delay = delay;
        self
    }

    /// Default headers with a `referer` of `<base_url>/` unless one was set
    pub fn default_headers(&self) -> Vec<(String, String)> {
        let mut headers = self.headers.clone();
        if !headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("referer"))
        {
            headers.push(("referer".to_string(), format!("{}/", self.base_url)));
        }
        headers
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base_url cannot be empty");
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!("base_url must start with http:// or https://");
        }

        if self.log_poll_delay.is_zero() {
            anyhow::bail!("log_poll_delay must be greater than 0");
        }

        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            anyhow::bail!("timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
