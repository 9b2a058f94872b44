//! Node (agent) endpoints
//!
//! The built-in node is addressed as `"master"`; it is mapped onto the identifier the
//! server uses in `/computer/...` URLs.

use serde_json::{Value, json};
use tracing::debug;

use jenkins_core::domain::node::{MASTER_NODE, computer_id};
use jenkins_core::dto::node::CreateNode;
use jenkins_core::dto::options::ReadOptions;

use crate::JenkinsClient;
use crate::error::{ClientError, Result};
use crate::middleware::{self, Pipeline};
use crate::request::{RequestBody, RequestDescriptor};

/// Operations on build nodes
#[derive(Debug, Clone, Copy)]
pub struct NodeClient<'a> {
    client: &'a JenkinsClient,
}

impl<'a> NodeClient<'a> {
    pub(crate) fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    // =============================================================================
    // Configuration
    // =============================================================================

    /// Get a node's `config.xml`
    pub async fn config(&self, name: &str) -> Result<String> {
        debug!(name, "node.config");
        configurable(name, "node.config")?;

        let req = RequestDescriptor::get("node.config", "/computer/{name}/config.xml")
            .param("name", name);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(name))
                    .then(middleware::text()),
            )
            .await
    }

    /// Replace a node's `config.xml`
    pub async fn set_config(&self, name: &str, xml: &str) -> Result<()> {
        debug!(name, "node.config");
        configurable(name, "node.config")?;

        if xml.is_empty() {
            return Err(ClientError::validation("xml required").in_operation("node.config"));
        }

        let req = RequestDescriptor::post("node.config", "/computer/{name}/config.xml")
            .param("name", name)
            .body(RequestBody::xml(xml));

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(name))
                    .then(middleware::empty()),
            )
            .await
    }

    // =============================================================================
    // Lifecycle
    // =============================================================================

    /// Create a permanent agent
    pub async fn create(&self, node: &CreateNode) -> Result<()> {
        debug!(name = %node.name, "node.create");
        required(&node.name, "node.create")?;

        let json = serde_json::to_string(node)
            .map_err(|e| ClientError::validation(e.to_string()).in_operation("node.create"))?;

        let req = RequestDescriptor::post("node.create", "/computer/doCreateItem")
            .query("name", &node.name)
            .query("type", &node.node_type)
            .query("json", json);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::require_302(&format!("failed to create: {}", node.name)))
                    .then(middleware::empty()),
            )
            .await
    }

    /// Delete a node
    pub async fn destroy(&self, name: &str) -> Result<()> {
        debug!(name, "node.destroy");
        required(name, "node.destroy")?;

        let req = RequestDescriptor::post("node.destroy", "/computer/{name}/doDelete")
            .param("name", computer_id(name));

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(name))
                    .then(middleware::require_302(&format!("failed to delete: {name}")))
                    .then(middleware::empty()),
            )
            .await
    }

    /// Alias of [`destroy`](Self::destroy)
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.destroy(name).await
    }

    // =============================================================================
    // Online state
    // =============================================================================

    /// Disconnect a node's agent, recording `message` as the reason
    ///
    /// An offline node only has its reason updated, and only when it differs.
    pub async fn disconnect(&self, name: &str, message: &str) -> Result<()> {
        debug!(name, message, "node.disconnect");
        required(name, "node.disconnect")?;

        let node = self.get(name, ReadOptions::new()).await?;
        if node["offline"].as_bool().unwrap_or(false) {
            if offline_reason(&node) == message {
                return Ok(());
            }
            return self.change_offline_cause(name, message).await;
        }

        let req = RequestDescriptor::post("node.disconnect", "/computer/{name}/doDisconnect")
            .param("name", computer_id(name))
            .query("offlineMessage", message);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(name))
                    .then(middleware::require_302(&format!("failed to disconnect: {name}")))
                    .then(middleware::empty()),
            )
            .await
    }

    /// Flip the node's temporarily-offline flag
    pub async fn toggle_offline(&self, name: &str, message: &str) -> Result<()> {
        debug!(name, message, "node.toggleOffline");
        required(name, "node.toggleOffline")?;

        let req = RequestDescriptor::post("node.toggleOffline", "/computer/{name}/toggleOffline")
            .param("name", computer_id(name))
            .query("offlineMessage", message);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(name))
                    .then(middleware::require_302(&format!("failed to toggle offline: {name}")))
                    .then(middleware::empty()),
            )
            .await
    }

    /// Update the reason recorded for an offline node
    pub async fn change_offline_cause(&self, name: &str, message: &str) -> Result<()> {
        debug!(name, message, "node.changeOfflineCause");
        required(name, "node.changeOfflineCause")?;

        let fields = vec![
            ("offlineMessage".to_string(), message.to_string()),
            (
                "json".to_string(),
                json!({ "offlineMessage": message }).to_string(),
            ),
            ("Submit".to_string(), "Update reason".to_string()),
        ];

        let req = RequestDescriptor::post(
            "node.changeOfflineCause",
            "/computer/{name}/changeOfflineCause",
        )
        .param("name", computer_id(name))
        .body(RequestBody::Form(fields));

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(name))
                    .then(middleware::require_302(&format!(
                        "failed to update offline cause: {name}"
                    )))
                    .then(middleware::empty()),
            )
            .await
    }

    /// Take a node temporarily offline
    ///
    /// An already offline node only has its reason updated, and only when it differs.
    pub async fn disable(&self, name: &str, message: Option<&str>) -> Result<()> {
        let message = message.unwrap_or("");
        debug!(name, message, "node.disable");
        required(name, "node.disable")?;

        let node = self.get(name, ReadOptions::new()).await?;
        if node["temporarilyOffline"].as_bool().unwrap_or(false) {
            if offline_reason(&node) == message {
                return Ok(());
            }
            return self.change_offline_cause(name, message).await;
        }

        self.toggle_offline(name, message).await
    }

    /// Bring a temporarily offline node back online
    pub async fn enable(&self, name: &str) -> Result<()> {
        debug!(name, "node.enable");
        required(name, "node.enable")?;

        let node = self.get(name, ReadOptions::new()).await?;
        if !node["temporarilyOffline"].as_bool().unwrap_or(false) {
            return Ok(());
        }

        self.toggle_offline(name, "").await
    }

    // =============================================================================
    // Queries
    // =============================================================================

    pub async fn exists(&self, name: &str) -> Result<bool> {
        debug!(name, "node.exists");
        required(name, "node.exists")?;

        let req = RequestDescriptor::head("node.exists", "/computer/{name}/api/json")
            .param("name", computer_id(name));

        self.client
            .request(req, Pipeline::new().then(middleware::exists()))
            .await
    }

    pub async fn get(&self, name: &str, options: ReadOptions) -> Result<Value> {
        debug!(name, ?options, "node.get");
        required(name, "node.get")?;

        let req = RequestDescriptor::get("node.get", "/computer/{name}/api/json")
            .param("name", computer_id(name))
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

    /// List nodes
    pub async fn list(&self, options: ReadOptions) -> Result<Vec<Value>> {
        debug!(?options, "node.list");

        let req = RequestDescriptor::get("node.list", "/computer/api/json").read_options(&options);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::require_array("computer"))
                    .then(middleware::body_item("computer")),
            )
            .await
    }

    /// The whole `/computer` object, executor totals included
    pub async fn list_full(&self, options: ReadOptions) -> Result<Value> {
        debug!(?options, "node.list");

        let req = RequestDescriptor::get("node.list", "/computer/api/json").read_options(&options);

        self.client
            .request(req, Pipeline::new().then(middleware::body()))
            .await
    }
}

fn required(name: &str, operation: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ClientError::validation("name required").in_operation(operation));
    }
    Ok(())
}

fn configurable(name: &str, operation: &str) -> Result<()> {
    required(name, operation)?;
    if name == MASTER_NODE {
        return Err(ClientError::validation("master not supported").in_operation(operation));
    }
    Ok(())
}

fn offline_reason(node: &Value) -> &str {
    node["offlineCauseReason"].as_str().unwrap_or("")
}
