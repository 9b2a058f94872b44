//! Node DTOs
//!
//! Data transfer objects for node-related operations.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::node::{DUMB_SLAVE_DESCRIPTOR, NodeMode};

/// Request to create a permanent agent
///
/// Serializes to the `json` form value expected by `/computer/doCreateItem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNode {
    /// Unique name for the node
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_description: Option<String>,

    /// Number of executors the node offers
    pub num_executors: u32,

    /// Root directory on the agent
    #[serde(rename = "remoteFS")]
    pub remote_fs: String,

    /// Space separated labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_string: Option<String>,

    pub mode: NodeMode,

    /// Descriptor of the agent implementation
    #[serde(rename = "type")]
    pub node_type: String,

    pub retention_strategy: Value,
    pub node_properties: Value,
    pub launcher: Value,
}

impl CreateNode {
    /// Creates a request for a JNLP agent with the server's usual defaults
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_description: None,
            num_executors: 2,
            remote_fs: "/var/lib/jenkins".to_string(),
            label_string: None,
            mode: NodeMode::Normal,
            node_type: DUMB_SLAVE_DESCRIPTOR.to_string(),
            retention_strategy: json!({ "stapler-class": "hudson.slaves.RetentionStrategy$Always" }),
            node_properties: json!({ "stapler-class-bag": "true" }),
            launcher: json!({ "stapler-class": "hudson.slaves.JNLPLauncher" }),
        }
    }

    pub fn exclusive(mut self) -> Self {
        self.mode = NodeMode::Exclusive;
        self
    }

    pub fn with_launcher(mut self, launcher: Value) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_labels(mut self, labels: impl Into<String>) -> Self {
        self.label_string = Some(labels.into());
        self
    }
}
