//! Build node domain types

use serde::{Deserialize, Serialize};

/// Name callers use for the built-in node
pub const MASTER_NODE: &str = "master";

/// Identifier the server uses for the built-in node in `/computer/...` URLs
pub const MASTER_NODE_ID: &str = "(master)";

/// Descriptor of the default permanent agent type
pub const DUMB_SLAVE_DESCRIPTOR: &str = "hudson.slaves.DumbSlave$DescriptorImpl";

/// Maps a node name onto its `/computer/{name}` path value
pub fn computer_id(name: &str) -> &str {
    if name == MASTER_NODE {
        MASTER_NODE_ID
    } else {
        name
    }
}

/// How the scheduler may use a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeMode {
    /// Use the node as much as possible
    #[default]
    Normal,
    /// Only build jobs whose label expression matches the node
    Exclusive,
}
