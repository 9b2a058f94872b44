//! Label endpoints

use serde_json::Value;
use tracing::debug;

use jenkins_core::dto::options::ReadOptions;

use crate::JenkinsClient;
use crate::error::{ClientError, Result};
use crate::middleware::{self, Pipeline};
use crate::request::RequestDescriptor;

#[derive(Debug, Clone, Copy)]
pub struct LabelClient<'a> {
    client: &'a JenkinsClient,
}

impl<'a> LabelClient<'a> {
    pub(crate) fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    /// Get a label expression and the nodes it matches
    pub async fn get(&self, name: &str, options: ReadOptions) -> Result<Value> {
        debug!(name, ?options, "label.get");

        if name.is_empty() {
            return Err(ClientError::validation("name required").in_operation("label.get"));
        }

        let req = RequestDescriptor::get("label.get", "/label/{name}/api/json")
            .param("name", name)
            .read_options(&options);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(name))
                    .then(middleware::body()),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::test_support::ScriptedTransport;
    use crate::transport::HttpResponse;
    use serde_json::json;

    #[tokio::test]
    async fn test_get() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_json(&json!({ "name": "linux && docker" })));
        let client = JenkinsClient::with_transport(ClientConfig::default(), transport.clone());

        let label = client
            .label()
            .get("linux && docker", ReadOptions::new())
            .await
            .unwrap();
        assert_eq!(label["name"], "linux && docker");
        assert_eq!(
            transport.last_request().url,
            "http://localhost:8080/label/linux%20%26%26%20docker/api/json"
        );
    }

    #[tokio::test]
    async fn test_get_requires_name() {
        let transport = ScriptedTransport::new();
        let client = JenkinsClient::with_transport(ClientConfig::default(), transport.clone());

        let err = client.label().get("", ReadOptions::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "label.get: name required");
        assert!(transport.requests().is_empty());
    }
}
