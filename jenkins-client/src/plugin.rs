//! Plugin manager endpoints

use serde_json::Value;
use tracing::debug;

use jenkins_core::dto::options::ReadOptions;

use crate::JenkinsClient;
use crate::error::Result;
use crate::middleware::{self, Pipeline};
use crate::request::RequestDescriptor;

#[derive(Debug, Clone, Copy)]
pub struct PluginClient<'a> {
    client: &'a JenkinsClient,
}

impl<'a> PluginClient<'a> {
    pub(crate) fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    /// List installed plugins
    ///
    /// Depth defaults to 1; at depth 0 the server omits every plugin detail.
    pub async fn list(&self, options: ReadOptions) -> Result<Vec<Value>> {
        let options = options.depth_or(1);
        debug!(?options, "plugin.list");

        let req = RequestDescriptor::get("plugin.list", "/pluginManager/api/json")
            .read_options(&options);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::require_array("plugins"))
                    .then(middleware::body_item("plugins")),
            )
            .await
    }
}
