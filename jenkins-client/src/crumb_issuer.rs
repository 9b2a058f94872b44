//! Crumb issuer endpoint

use tracing::debug;

use jenkins_core::domain::crumb::{Crumb, CrumbResponse};

use crate::JenkinsClient;
use crate::error::{ClientError, Result};
use crate::middleware::{Context, Flow, Pipeline};
use crate::request::RequestDescriptor;

/// Access to the server's CSRF crumb issuer
#[derive(Debug, Clone, Copy)]
pub struct CrumbIssuerClient<'a> {
    client: &'a JenkinsClient,
}

impl<'a> CrumbIssuerClient<'a> {
    pub(crate) fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    /// Request a fresh crumb
    ///
    /// When the server uses its stock issuer, the session cookies it set are returned
    /// along with the crumb since the crumb is only valid for that session.
    pub async fn get(&self) -> Result<Crumb> {
        debug!("crumbIssuer.get");

        let req = RequestDescriptor::get("crumbIssuer.get", "/crumbIssuer/api/json");

        // Never routed through crumb injection, which calls back into this method.
        self.client
            .dispatch(req, Pipeline::new().then(crumb))
            .await
    }
}

fn crumb(ctx: Context) -> Flow<Crumb> {
    if let Some(err) = ctx.err {
        return Flow::Done(Err(err));
    }
    let Some(res) = ctx.res else {
        return Flow::Done(Err(ClientError::data_shape("returned bad data")));
    };

    let Ok(body) = res.json::<CrumbResponse>() else {
        return Flow::Done(Err(ClientError::data_shape("returned bad data")));
    };

    let cookies: Vec<String> = if body.is_default_issuer() {
        res.header_all("set-cookie")
            .into_iter()
            .filter_map(|cookie| cookie.split(';').next())
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    match body.into_crumb() {
        Some(crumb) => Flow::Done(Ok(crumb.with_cookies(cookies))),
        None => Flow::Done(Err(ClientError::data_shape("returned bad data"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::crumb::CrumbIssuer;
    use crate::test_support::ScriptedTransport;
    use crate::transport::HttpResponse;
    use serde_json::json;

    #[tokio::test]
    async fn test_get() {
        let transport = ScriptedTransport::new().respond(
            HttpResponse::new(200)
                .with_header("set-cookie", "JSESSIONID=abc; Path=/")
                .with_json(&json!({
                    "_class": "hudson.security.csrf.DefaultCrumbIssuer",
                    "crumb": "V",
                    "crumbRequestField": "Jenkins-Crumb"
                })),
        );
        let client = JenkinsClient::with_transport(
            ClientConfig::default().with_crumb_issuer(CrumbIssuer::Server),
            transport.clone(),
        );

        let crumb = client.crumb_issuer().get().await.unwrap();
        assert_eq!(crumb.header_name, "Jenkins-Crumb");
        assert_eq!(crumb.header_value, "V");
        assert_eq!(crumb.cookies, vec!["JSESSIONID=abc".to_string()]);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://localhost:8080/crumbIssuer/api/json");
    }

    #[tokio::test]
    async fn test_other_issuer_ignores_cookies() {
        let transport = ScriptedTransport::new().respond(
            HttpResponse::new(200)
                .with_header("set-cookie", "JSESSIONID=abc; Path=/")
                .with_json(&json!({ "_class": "custom.Issuer", "crumb": "V", "crumbRequestField": "H" })),
        );
        let client = JenkinsClient::with_transport(ClientConfig::default(), transport);

        let crumb = client.crumb_issuer().get().await.unwrap();
        assert!(crumb.cookies.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_when_csrf_disabled() {
        let transport = ScriptedTransport::new().respond(HttpResponse::new(404));
        let client = JenkinsClient::with_transport(ClientConfig::default(), transport);

        let err = client.crumb_issuer().get().await.unwrap_err();
        assert_eq!(err.to_string(), "crumbIssuer.get: Not Found");
        assert_eq!(err.status(), Some(404));
    }
}
