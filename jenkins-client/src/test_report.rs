//! Test report endpoints

use serde_json::Value;
use tracing::debug;

use jenkins_core::domain::build::BuildNumber;
use jenkins_core::dto::options::ReadOptions;

use crate::JenkinsClient;
use crate::build::target;
use crate::error::Result;
use crate::middleware::{self, Pipeline};
use crate::path::FolderPath;
use crate::request::RequestDescriptor;

/// Access to the JUnit results published by a build
#[derive(Debug, Clone, Copy)]
pub struct TestReportClient<'a> {
    client: &'a JenkinsClient,
}

impl<'a> TestReportClient<'a> {
    pub(crate) fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    /// Get the test report of a build
    pub async fn get(
        &self,
        name: impl Into<FolderPath>,
        number: impl Into<BuildNumber>,
        options: ReadOptions,
    ) -> Result<Value> {
        let (folder, number) = target(name.into(), number.into(), "testReport.get")?;
        debug!(%folder, %number, ?options, "testReport.get");

        let path = "{folder}/{number}/testReport/api/json";
        let req = RequestDescriptor::get("testReport.get", path)
            .param("folder", folder.path())
            .param("number", number.to_string())
            .read_options(&options);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(&format!("{folder} {number}")))
                    .then(middleware::body()),
            )
            .await
    }
}
