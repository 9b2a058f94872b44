//! Job DTOs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Options for triggering a build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobBuildOptions {
    /// Build parameters; when non-empty the build is triggered through `buildWithParameters`
    pub parameters: BTreeMap<String, String>,
    /// Remote trigger token
    pub token: Option<String>,
}

impl JobBuildOptions {
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
