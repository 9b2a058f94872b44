//! Build queue endpoints

use serde_json::Value;
use tracing::debug;

use jenkins_core::dto::options::ReadOptions;

use crate::JenkinsClient;
use crate::error::{ClientError, Result};
use crate::middleware::{self, Pipeline};
use crate::request::RequestDescriptor;

/// Operations on the build queue
#[derive(Debug, Clone, Copy)]
pub struct QueueClient<'a> {
    client: &'a JenkinsClient,
}

impl<'a> QueueClient<'a> {
    pub(crate) fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    /// List queued items
    pub async fn list(&self, options: ReadOptions) -> Result<Vec<Value>> {
        debug!(?options, "queue.list");

        let req = RequestDescriptor::get("queue.list", "/queue/api/json").read_options(&options);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::require_array("items"))
                    .then(middleware::body_item("items")),
            )
            .await
    }

    /// Get a queued item
    ///
    /// Once the item has left the queue, its `executable` field names the build.
    pub async fn item(&self, number: u64, options: ReadOptions) -> Result<Value> {
        debug!(number, ?options, "queue.item");

        if number == 0 {
            return Err(ClientError::validation("number required").in_operation("queue.item"));
        }

        let req = RequestDescriptor::get("queue.item", "/queue/item/{number}/api/json")
            .param("number", number)
            .read_options(&options);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(&format!("queue item {number}")))
                    .then(middleware::body()),
            )
            .await
    }

    /// Cancel a queued item
    pub async fn cancel(&self, number: u64) -> Result<()> {
        debug!(number, "queue.cancel");

        if number == 0 {
            return Err(ClientError::validation("number required").in_operation("queue.cancel"));
        }

        let req = RequestDescriptor::post("queue.cancel", "/queue/item/{number}/cancelQueue")
            .param("number", number);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::require_302(&format!("failed to cancel: {number}")))
                    .then(middleware::empty()),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ErrorKind;
    use crate::test_support::ScriptedTransport;
    use crate::transport::HttpResponse;
    use reqwest::Method;
    use serde_json::json;

    fn client(transport: &ScriptedTransport) -> JenkinsClient {
        JenkinsClient::with_transport(ClientConfig::default(), transport.clone())
    }

    #[tokio::test]
    async fn test_list() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_json(&json!({ "items": [{ "id": 3 }] })))
            .respond(HttpResponse::new(200).with_json(&json!({ "discoverableItems": [] })));
        let client = client(&transport);

        let items = client.queue().list(ReadOptions::new()).await.unwrap();
        assert_eq!(items[0]["id"], 3);
        assert_eq!(transport.last_request().url, "http://localhost:8080/queue/api/json");

        let err = client.queue().list(ReadOptions::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataShape);
        assert_eq!(err.to_string(), "queue.list: returned bad data");
    }

    #[tokio::test]
    async fn test_item() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_json(&json!({
                "id": 42,
                "executable": { "number": 7 }
            })))
            .respond(HttpResponse::new(404));
        let client = client(&transport);

        let item = client.queue().item(42, ReadOptions::new()).await.unwrap();
        assert_eq!(item["executable"]["number"], 7);
        assert_eq!(
            transport.last_request().url,
            "http://localhost:8080/queue/item/42/api/json"
        );

        let err = client.queue().item(43, ReadOptions::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_cancel() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(302))
            .respond(HttpResponse::new(200));
        let client = client(&transport);

        client.queue().cancel(42).await.unwrap();
        let request = transport.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "http://localhost:8080/queue/item/42/cancelQueue");

        let err = client.queue().cancel(42).await.unwrap_err();
        assert_eq!(err.to_string(), "queue.cancel: failed to cancel: 42");

        let err = client.queue().cancel(0).await.unwrap_err();
        assert_eq!(err.to_string(), "queue.cancel: number required");
    }
}
