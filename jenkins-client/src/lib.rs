//! Jenkins HTTP Client
//!
//! An async client for the Jenkins remote access API. Operations are grouped by the
//! resource they act on (`build`, `job`, `node`, `queue`, `view`, `credentials`,
//! `crumb_issuer`, `label`, `plugin`, `test_report`), each reached through an accessor on
//! [`JenkinsClient`].
//!
//! Jobs nested in folders are addressed by slash-delimited names (`"folder/job"`), by
//! segment arrays, or by their full URL.
//!
//! # Example
//!
//! ```no_run
//! use jenkins_client::{ClientConfig, CrumbIssuer, JenkinsClient};
//! use jenkins_core::dto::job::JobBuildOptions;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::new("http://localhost:8080")
//!         .with_credentials("admin", "token")
//!         .with_crumb_issuer(CrumbIssuer::Server);
//!     let client = JenkinsClient::from_config(config)?;
//!
//!     let queued = client
//!         .job()
//!         .build("folder/example", JobBuildOptions::default().with_parameter("branch", "main"))
//!         .await?;
//!     println!("queued as {queued:?}");
//!
//!     let build = client.build().get("folder/example", 1, Default::default()).await?;
//!     println!("result: {}", build["result"]);
//!     Ok(())
//! }
//! ```

pub mod build;
pub mod config;
pub mod credentials;
pub mod crumb;
pub mod crumb_issuer;
pub mod error;
pub mod job;
pub mod label;
pub mod log_stream;
pub mod middleware;
pub mod node;
pub mod path;
pub mod plugin;
pub mod queue;
pub mod request;
pub mod test_report;
pub mod transport;
pub mod view;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::ClientConfig;
pub use crumb::{CrumbIssuer, CrumbSource};
pub use error::{ClientError, ErrorKind, Result};
pub use log_stream::{LogEvent, LogStream};
pub use path::FolderPath;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use jenkins_core::dto::options::ReadOptions;

use crate::middleware::{Context, Pipeline};
use crate::request::RequestDescriptor;

/// HTTP client for the Jenkins API
///
/// Cloning is cheap; clones share the transport and configuration.
#[derive(Clone)]
pub struct JenkinsClient {
    /// Base URL without a trailing slash
    base_url: String,
    /// Headers sent with every request
    headers: Arc<Vec<(String, String)>>,
    transport: Arc<dyn Transport>,
    crumb_issuer: CrumbIssuer,
    log_poll_delay: Duration,
}

impl JenkinsClient {
    /// Create a client for `base_url` with default settings
    ///
    /// # Example
    /// ```
    /// use jenkins_client::JenkinsClient;
    ///
    /// let client = JenkinsClient::new("http://localhost:8080/").unwrap();
    /// assert_eq!(client.base_url(), "http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Self::from_config(ClientConfig::new(base_url))
    }

    /// Create a client backed by the reqwest transport
    pub fn from_config(config: ClientConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client that sends every request through `transport`
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            headers: Arc::new(config.default_headers()),
            base_url: config.base_url,
            transport: Arc::new(transport),
            crumb_issuer: config.crumb_issuer,
            log_poll_delay: config.log_poll_delay,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn crumb_issuer_mode(&self) -> &CrumbIssuer {
        &self.crumb_issuer
    }

    pub(crate) fn log_poll_delay(&self) -> Duration {
        self.log_poll_delay
    }

    // =============================================================================
    // Resources
    // =============================================================================

    pub fn build(&self) -> build::BuildClient<'_> {
        build::BuildClient::new(self)
    }

    pub fn credentials(&self) -> credentials::CredentialsClient<'_> {
        credentials::CredentialsClient::new(self)
    }

    pub fn crumb_issuer(&self) -> crumb_issuer::CrumbIssuerClient<'_> {
        crumb_issuer::CrumbIssuerClient::new(self)
    }

    pub fn job(&self) -> job::JobClient<'_> {
        job::JobClient::new(self)
    }

    pub fn label(&self) -> label::LabelClient<'_> {
        label::LabelClient::new(self)
    }

    pub fn node(&self) -> node::NodeClient<'_> {
        node::NodeClient::new(self)
    }

    pub fn plugin(&self) -> plugin::PluginClient<'_> {
        plugin::PluginClient::new(self)
    }

    pub fn queue(&self) -> queue::QueueClient<'_> {
        queue::QueueClient::new(self)
    }

    pub fn test_report(&self) -> test_report::TestReportClient<'_> {
        test_report::TestReportClient::new(self)
    }

    pub fn view(&self) -> view::ViewClient<'_> {
        view::ViewClient::new(self)
    }

    /// Server information from `/api/json`
    pub async fn info(&self, options: ReadOptions) -> Result<Value> {
        debug!(?options, "info");

        let req = RequestDescriptor::get("info", "/api/json").read_options(&options);
        self.request(req, Pipeline::new().then(middleware::body()))
            .await
    }

    /// Alias of [`info`](Self::info)
    pub async fn get(&self, options: ReadOptions) -> Result<Value> {
        self.info(options).await
    }

    // =============================================================================
    // Dispatch
    // =============================================================================

    /// Sends a request, attaching a crumb first when it mutates server state
    pub(crate) async fn request<T>(
        &self,
        req: RequestDescriptor,
        pipeline: Pipeline<T>,
    ) -> Result<T> {
        let name = req.name.clone();
        let req = self
            .crumb_issuer
            .inject(self, req)
            .await
            .map_err(|e| e.in_operation(name))?;

        self.dispatch(req, pipeline).await
    }

    /// Sends a request as-is and runs its response pipeline
    pub(crate) async fn dispatch<T>(
        &self,
        req: RequestDescriptor,
        pipeline: Pipeline<T>,
    ) -> Result<T> {
        let http = req
            .to_http_request(&self.base_url, &self.headers)
            .map_err(|e| e.in_operation(req.name.clone()))?;

        let outcome = self.transport.send(http).await;
        let result = pipeline.run(Context::from_outcome(outcome));

        result.map_err(|e| {
            debug!(operation = %req.name, error = %e, "request failed");
            e.in_operation(req.name)
        })
    }
}

impl std::fmt::Debug for JenkinsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JenkinsClient")
            .field("base_url", &self.base_url)
            .field("crumb_issuer", &self.crumb_issuer)
            .finish_non_exhaustive()
    }
}
