//! Read options shared by `api/json` endpoints

use serde::{Deserialize, Serialize};

/// `depth` and `tree` query parameters of the remote access API
///
/// Both are left off the request when unset; operations that need a default depth
/// apply it themselves through [`ReadOptions::depth_or`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOptions {
    pub depth: Option<u32>,
    pub tree: Option<String>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_tree(mut self, tree: impl Into<String>) -> Self {
        self.tree = Some(tree.into());
        self
    }

    /// Returns these options with `depth` filled in when the caller left it unset
    pub fn depth_or(mut self, depth: u32) -> Self {
        self.depth.get_or_insert(depth);
        self
    }
}
