//! CSRF crumb injection
//!
//! Jenkins rejects mutating requests that lack a valid crumb when CSRF protection is
//! enabled. A crumb is fetched before every mutating call and attached to its headers;
//! nothing is cached between calls.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use jenkins_core::domain::crumb::Crumb;

use crate::JenkinsClient;
use crate::error::{ClientError, Result};
use crate::request::RequestDescriptor;

/// Something that can produce a crumb for the next mutating request
#[async_trait]
pub trait CrumbSource: Send + Sync {
    async fn fetch(&self, client: &JenkinsClient) -> Result<Crumb>;
}

/// Fetches a fresh crumb from `/crumbIssuer/api/json`
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerCrumbSource;

#[async_trait]
impl CrumbSource for ServerCrumbSource {
    async fn fetch(&self, client: &JenkinsClient) -> Result<Crumb> {
        client.crumb_issuer().get().await
    }
}

/// A fixed crumb, e.g. one obtained out of band
#[async_trait]
impl CrumbSource for Crumb {
    async fn fetch(&self, _client: &JenkinsClient) -> Result<Crumb> {
        Ok(self.clone())
    }
}

/// How mutating requests obtain their crumb
#[derive(Clone, Default)]
pub enum CrumbIssuer {
    /// Requests are sent without a crumb
    #[default]
    Disabled,
    /// A crumb is requested from the server before each mutating call
    Server,
    /// A caller-supplied source is asked before each mutating call
    Custom(Arc<dyn CrumbSource>),
}

impl fmt::Debug for CrumbIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrumbIssuer::Disabled => f.write_str("Disabled"),
            CrumbIssuer::Server => f.write_str("Server"),
            CrumbIssuer::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl CrumbIssuer {
    pub fn custom(source: impl CrumbSource + 'static) -> Self {
        CrumbIssuer::Custom(Arc::new(source))
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, CrumbIssuer::Disabled)
    }

    async fn fetch(&self, client: &JenkinsClient) -> Option<Result<Crumb>> {
        match self {
            CrumbIssuer::Disabled => None,
            CrumbIssuer::Server => Some(ServerCrumbSource.fetch(client).await),
            CrumbIssuer::Custom(source) => Some(source.fetch(client).await),
        }
    }

    /// Attaches a crumb to a mutating request
    ///
    /// Non-mutating requests and a disabled issuer leave the request untouched. A failed
    /// fetch or a crumb missing its name or value aborts the call.
    pub(crate) async fn inject(
        &self,
        client: &JenkinsClient,
        descriptor: RequestDescriptor,
    ) -> Result<RequestDescriptor> {
        if !descriptor.is_mutating() {
            return Ok(descriptor);
        }

        let crumb = match self.fetch(client).await {
            None => return Ok(descriptor),
            Some(Ok(crumb)) if crumb.is_usable() => crumb,
            Some(Ok(_)) => {
                warn!(operation = %descriptor.name, "crumb issuer returned an incomplete crumb");
                return Err(ClientError::crumb("failed to get crumb"));
            }
            Some(Err(e)) => {
                warn!(operation = %descriptor.name, error = %e, "crumb fetch failed");
                return Err(ClientError::crumb("failed to get crumb"));
            }
        };

        debug!(operation = %descriptor.name, header = %crumb.header_name, "injecting crumb");

        let mut descriptor = descriptor.header(&crumb.header_name, crumb.header_value);
        if !crumb.cookies.is_empty() {
            descriptor = descriptor.header("cookie", crumb.cookies.join("; "));
        }

        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ErrorKind;
    use crate::test_support::ScriptedTransport;
    use crate::transport::HttpResponse;
    use jenkins_core::dto::options::ReadOptions;
    use serde_json::json;

    fn client(issuer: CrumbIssuer, transport: &ScriptedTransport) -> JenkinsClient {
        JenkinsClient::with_transport(
            ClientConfig::default().with_crumb_issuer(issuer),
            transport.clone(),
        )
    }

    #[tokio::test]
    async fn test_server_crumb_is_injected() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_json(&json!({
                "crumb": "V",
                "crumbRequestField": "H"
            })))
            .respond(HttpResponse::new(302));
        let client = client(CrumbIssuer::Server, &transport);

        client.job().disable("test").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].url.ends_with("/crumbIssuer/api/json"));
        assert_eq!(requests[1].header("H"), Some("V"));
        assert_eq!(requests[1].header("cookie"), None);
    }

    #[tokio::test]
    async fn test_default_issuer_cookies_are_forwarded() {
        let transport = ScriptedTransport::new()
            .respond(
                HttpResponse::new(200)
                    .with_header("set-cookie", "JSESSIONID.1=abc; Path=/; HttpOnly")
                    .with_header("set-cookie", "other=2")
                    .with_json(&json!({
                        "_class": "hudson.security.csrf.DefaultCrumbIssuer",
                        "crumb": "V",
                        "crumbRequestField": "Jenkins-Crumb"
                    })),
            )
            .respond(HttpResponse::new(302));
        let client = client(CrumbIssuer::Server, &transport);

        client.job().enable("test").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[1].header("Jenkins-Crumb"), Some("V"));
        assert_eq!(requests[1].header("cookie"), Some("JSESSIONID.1=abc; other=2"));
    }

    #[tokio::test]
    async fn test_incomplete_crumb_aborts_call() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_json(&json!({ "crumbRequestField": "H" })));
        let client = client(CrumbIssuer::Server, &transport);

        let err = client.job().disable("test").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crumb);
        assert_eq!(err.to_string(), "job.disable: failed to get crumb");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_source_and_reads_skip_crumb() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_json(&json!({ "name": "test" })))
            .respond(HttpResponse::new(302));
        let client = client(CrumbIssuer::custom(Crumb::new("X-Crumb", "fixed")), &transport);

        client.job().get("test", ReadOptions::new()).await.unwrap();
        client.job().destroy("test").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].header("X-Crumb"), None);
        assert_eq!(requests[1].header("X-Crumb"), Some("fixed"));
    }

    #[tokio::test]
    async fn test_disabled_issuer_sends_no_crumb() {
        let transport = ScriptedTransport::new().respond(HttpResponse::new(302));
        let client = client(CrumbIssuer::Disabled, &transport);

        client.job().disable("test").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.ends_with("/job/test/disable"));
    }
}
