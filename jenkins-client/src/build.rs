//! Build endpoints

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use jenkins_core::domain::build::BuildNumber;
use jenkins_core::domain::log::LogText;
use jenkins_core::dto::build::{BuildLogOptions, DEFAULT_LOG_POLL_DELAY_MS, LogStreamOptions};
use jenkins_core::dto::options::ReadOptions;

use crate::JenkinsClient;
use crate::error::{ClientError, Result};
use crate::log_stream::LogStream;
use crate::middleware::{self, Context, Flow, Pipeline};
use crate::path::FolderPath;
use crate::request::{RequestBody, RequestDescriptor};

/// Operations on a single build of a job
#[derive(Debug, Clone, Copy)]
pub struct BuildClient<'a> {
    client: &'a JenkinsClient,
}

impl<'a> BuildClient<'a> {
    pub(crate) fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    /// Get a build
    ///
    /// # Arguments
    /// * `name` - Job name, folder path or job URL
    /// * `number` - Build number or a permalink such as `lastBuild`
    pub async fn get(
        &self,
        name: impl Into<FolderPath>,
        number: impl Into<BuildNumber>,
        options: ReadOptions,
    ) -> Result<Value> {
        let (folder, number) = target(name.into(), number.into(), "build.get")?;
        debug!(%folder, %number, ?options, "build.get");

        let req = RequestDescriptor::get("build.get", "{folder}/{number}/api/json")
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

    /// Abort a running build
    pub async fn stop(
        &self,
        name: impl Into<FolderPath>,
        number: impl Into<BuildNumber>,
    ) -> Result<()> {
        let (folder, number) = target(name.into(), number.into(), "build.stop")?;
        debug!(%folder, %number, "build.stop");

        let req = RequestDescriptor::post("build.stop", "{folder}/{number}/stop")
            .param("folder", folder.path())
            .param("number", number.to_string());

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(&format!("{folder} {number}")))
                    .then(middleware::require_302(&format!("failed to stop: {folder}")))
                    .then(middleware::empty()),
            )
            .await
    }

    /// Terminate a build that did not respond to [`stop`](Self::stop)
    pub async fn term(
        &self,
        name: impl Into<FolderPath>,
        number: impl Into<BuildNumber>,
    ) -> Result<()> {
        let (folder, number) = target(name.into(), number.into(), "build.term")?;
        debug!(%folder, %number, "build.term");

        let req = RequestDescriptor::post("build.term", "{folder}/{number}/term")
            .param("folder", folder.path())
            .param("number", number.to_string());

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(&format!("{folder} {number}")))
                    .then(middleware::empty()),
            )
            .await
    }

    /// Fetch build log output starting at `options.start`
    ///
    /// `more` reports whether the build is still writing output, and `size` is the
    /// offset to pass as `start` on the next call.
    pub async fn log(
        &self,
        name: impl Into<FolderPath>,
        number: impl Into<BuildNumber>,
        options: BuildLogOptions,
    ) -> Result<LogText> {
        let (folder, number) = target(name.into(), number.into(), "build.log")?;
        debug!(%folder, %number, ?options, "build.log");

        let fields = options
            .start
            .map(|start| vec![("start".to_string(), start.to_string())])
            .unwrap_or_default();

        let path = "{folder}/{number}/logText/progressive{type}";
        let req = RequestDescriptor::post("build.log", path)
            .param("folder", folder.path())
            .param("number", number.to_string())
            .param("type", options.format.endpoint_suffix())
            .body(RequestBody::Form(fields));

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(&format!("{folder} {number}")))
                    .then(log_text),
            )
            .await
    }

    /// Follow the build log until the build finishes
    ///
    /// Polling starts on the tokio runtime after this returns; the first fetch never
    /// happens inside this call.
    pub fn log_stream(
        &self,
        name: impl Into<FolderPath>,
        number: impl Into<BuildNumber>,
        options: LogStreamOptions,
    ) -> Result<LogStream> {
        let (folder, number) = target(name.into(), number.into(), "build.logStream")?;
        debug!(%folder, %number, ?options, "build.logStream");

        let delay = options
            .delay_ms
            .filter(|delay| *delay > 0)
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.client.log_poll_delay());
        let delay = if delay.is_zero() {
            Duration::from_millis(DEFAULT_LOG_POLL_DELAY_MS)
        } else {
            delay
        };

        LogStream::spawn(self.client.clone(), folder, number, options.format, delay)
            .map_err(|e| e.in_operation("build.logStream"))
    }
}

/// Validates a build address
pub(crate) fn target(
    folder: FolderPath,
    number: BuildNumber,
    operation: &str,
) -> Result<(FolderPath, BuildNumber)> {
    let folder = folder.required().map_err(|e| e.in_operation(operation))?;
    if !number.is_valid() {
        return Err(ClientError::validation("number required").in_operation(operation));
    }
    Ok((folder, number))
}

fn log_text(ctx: Context) -> Flow<LogText> {
    if let Some(err) = ctx.err {
        return Flow::Done(Err(err));
    }
    let Some(res) = ctx.res else {
        return Flow::Done(Err(ClientError::data_shape("returned bad data")));
    };

    Flow::Done(Ok(LogText {
        text: res.text(),
        more: res.header("x-more-data") == Some("true"),
        size: res.header("x-text-size").and_then(|size| size.parse().ok()),
    }))
}
