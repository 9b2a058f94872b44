//! Job endpoints

use serde_json::Value;
use tracing::debug;

use jenkins_core::dto::job::JobBuildOptions;
use jenkins_core::dto::options::ReadOptions;

use crate::JenkinsClient;
use crate::error::{ClientError, Result};
use crate::middleware::{self, Pipeline};
use crate::path::FolderPath;
use crate::request::{RequestBody, RequestDescriptor};

/// Operations on jobs, including jobs nested in folders
#[derive(Debug, Clone, Copy)]
pub struct JobClient<'a> {
    client: &'a JenkinsClient,
}

impl<'a> JobClient<'a> {
    pub(crate) fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    // =============================================================================
    // Builds
    // =============================================================================

    /// Trigger a build
    ///
    /// With parameters the build goes through `buildWithParameters`.
    ///
    /// # Returns
    /// The queue item number, when the server reported one
    pub async fn build(
        &self,
        name: impl Into<FolderPath>,
        options: JobBuildOptions,
    ) -> Result<Option<u64>> {
        let folder = required(name.into(), "job.build")?;
        debug!(%folder, ?options, "job.build");

        let path = if options.parameters.is_empty() {
            "{folder}/build"
        } else {
            "{folder}/buildWithParameters"
        };

        let mut req = RequestDescriptor::post("job.build", path).param("folder", folder.path());
        for (key, value) in &options.parameters {
            req = req.query(key, value);
        }
        req = req.query_opt("token", options.token.as_deref());

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(&folder.to_string()))
                    .then(middleware::ignore_error_for_status_codes(&[302]))
                    .then(middleware::queue_location()),
            )
            .await
    }

    // =============================================================================
    // Configuration
    // =============================================================================

    /// Get the job's `config.xml`
    pub async fn config(&self, name: impl Into<FolderPath>) -> Result<String> {
        let folder = required(name.into(), "job.config")?;
        debug!(%folder, "job.config");

        let req = RequestDescriptor::get("job.config", "{folder}/config.xml")
            .param("folder", folder.path());

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(&folder.to_string()))
                    .then(middleware::text()),
            )
            .await
    }

    /// Replace the job's `config.xml`
    pub async fn set_config(&self, name: impl Into<FolderPath>, xml: &str) -> Result<()> {
        let folder = required(name.into(), "job.config")?;
        debug!(%folder, "job.config");

        if xml.is_empty() {
            return Err(ClientError::validation("xml required").in_operation("job.config"));
        }

        let req = RequestDescriptor::post("job.config", "{folder}/config.xml")
            .param("folder", folder.path())
            .body(RequestBody::xml(xml));

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(&folder.to_string()))
                    .then(middleware::empty()),
            )
            .await
    }

    // =============================================================================
    // Lifecycle
    // =============================================================================

    /// Copy job `from` to a new job `name`
    ///
    /// The new job is created in `name`'s parent folder.
    pub async fn copy(
        &self,
        from: impl Into<FolderPath>,
        name: impl Into<FolderPath>,
    ) -> Result<()> {
        let from = from
            .into()
            .required()
            .map_err(|_| ClientError::validation("from required").in_operation("job.copy"))?;
        let folder = required(name.into(), "job.copy")?;
        debug!(%from, %folder, "job.copy");

        let req = RequestDescriptor::post("job.copy", "{dir}/createItem")
            .param("dir", folder.dir())
            .query("name", folder.name())
            .query("from", from.to_string())
            .query("mode", "copy")
            .header("content-type", "text/xml");

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::require_302(&format!("failed to create: {folder}")))
                    .then(middleware::empty()),
            )
            .await
    }

    /// Create a job from a `config.xml` document
    pub async fn create(&self, name: impl Into<FolderPath>, xml: &str) -> Result<()> {
        let folder = required(name.into(), "job.create")?;
        debug!(%folder, "job.create");

        if xml.is_empty() {
            return Err(ClientError::validation("xml required").in_operation("job.create"));
        }

        let req = RequestDescriptor::post("job.create", "{dir}/createItem")
            .param("dir", folder.dir())
            .query("name", folder.name())
            .body(RequestBody::xml(xml));

        self.client
            .request(req, Pipeline::new().then(middleware::empty()))
            .await
    }

    /// Delete a job
    pub async fn destroy(&self, name: impl Into<FolderPath>) -> Result<()> {
        self.post_action(name.into(), "job.destroy", "doDelete", "delete")
            .await
    }

    /// Alias of [`destroy`](Self::destroy)
    pub async fn delete(&self, name: impl Into<FolderPath>) -> Result<()> {
        self.destroy(name).await
    }

    pub async fn disable(&self, name: impl Into<FolderPath>) -> Result<()> {
        self.post_action(name.into(), "job.disable", "disable", "disable")
            .await
    }

    pub async fn enable(&self, name: impl Into<FolderPath>) -> Result<()> {
        self.post_action(name.into(), "job.enable", "enable", "enable")
            .await
    }

    /// POSTs to `{folder}/<action>` and requires the 302 Jenkins answers on success
    async fn post_action(
        &self,
        folder: FolderPath,
        operation: &str,
        action: &str,
        verb: &str,
    ) -> Result<()> {
        let folder = required(folder, operation)?;
        debug!(%folder, "{operation}");

        let req = RequestDescriptor::post(operation, format!("{{folder}}/{action}"))
            .param("folder", folder.path());

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(&folder.to_string()))
                    .then(middleware::require_302(&format!("failed to {verb}: {folder}")))
                    .then(middleware::empty()),
            )
            .await
    }

    // =============================================================================
    // Queries
    // =============================================================================

    /// Check whether a job exists
    pub async fn exists(&self, name: impl Into<FolderPath>) -> Result<bool> {
        let folder = required(name.into(), "job.exists")?;
        debug!(%folder, "job.exists");

        let req = RequestDescriptor::head("job.exists", "{folder}/api/json")
            .param("folder", folder.path());

        self.client
            .request(req, Pipeline::new().then(middleware::exists()))
            .await
    }

    /// Get a job
    ///
    /// Depth defaults to 0.
    pub async fn get(&self, name: impl Into<FolderPath>, options: ReadOptions) -> Result<Value> {
        let folder = required(name.into(), "job.get")?;
        let options = options.depth_or(0);
        debug!(%folder, ?options, "job.get");

        let req = RequestDescriptor::get("job.get", "{folder}/api/json")
            .param("folder", folder.path())
            .read_options(&options);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(&folder.to_string()))
                    .then(middleware::body()),
            )
            .await
    }

    /// List the jobs of a folder; an empty path lists the top level
    pub async fn list(
        &self,
        folder: impl Into<FolderPath>,
        options: ReadOptions,
    ) -> Result<Vec<Value>> {
        let folder = folder.into();
        debug!(%folder, ?options, "job.list");

        let req = RequestDescriptor::get("job.list", "{folder}/api/json")
            .param("folder", folder.path())
            .read_options(&options);

        let mut pipeline = Pipeline::new();
        if !folder.is_empty() {
            pipeline = pipeline.then(middleware::not_found(&folder.to_string()));
        }

        self.client
            .request(
                req,
                pipeline
                    .then(middleware::require_array("jobs"))
                    .then(middleware::body_item("jobs")),
            )
            .await
    }
}

fn required(folder: FolderPath, operation: &str) -> Result<FolderPath> {
    folder.required().map_err(|e| e.in_operation(operation))
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
    async fn test_build_returns_queue_number() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(201).with_header("location", "http://localhost:8080/queue/item/42/"))
            .respond(HttpResponse::new(302).with_header("location", "http://localhost:8080/queue/item/43/"));
        let client = client(&transport);

        let number = client.job().build("test", JobBuildOptions::default()).await.unwrap();
        assert_eq!(number, Some(42));
        let request = transport.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "http://localhost:8080/job/test/build");

        let options = JobBuildOptions::default()
            .with_parameter("branch", "main")
            .with_token("secret");
        let number = client.job().build("folder/test", options).await.unwrap();
        assert_eq!(number, Some(43));
        assert_eq!(
            transport.last_request().url,
            "http://localhost:8080/job/folder/job/test/buildWithParameters?branch=main&token=secret"
        );
    }

    #[tokio::test]
    async fn test_build_without_location() {
        let transport = ScriptedTransport::new().respond(HttpResponse::new(201));
        let client = client(&transport);

        let number = client.job().build("test", JobBuildOptions::default()).await.unwrap();
        assert_eq!(number, None);
    }

    #[tokio::test]
    async fn test_build_not_found() {
        let transport = ScriptedTransport::new().respond(HttpResponse::new(404));
        let client = client(&transport);

        let err = client.job().build("test", JobBuildOptions::default()).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "job.build: test not found");
    }

    #[tokio::test]
    async fn test_config_get_and_set() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_body("<project/>"))
            .respond(HttpResponse::new(200));
        let client = client(&transport);

        let xml = client.job().config("test").await.unwrap();
        assert_eq!(xml, "<project/>");
        assert_eq!(transport.last_request().method, Method::GET);

        client.job().set_config("test", "<project></project>").await.unwrap();
        let request = transport.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "http://localhost:8080/job/test/config.xml");
        assert_eq!(request.header("content-type"), Some("text/xml; charset=utf-8"));
        assert_eq!(request.body.as_deref(), Some(&b"<project></project>"[..]));
    }

    #[tokio::test]
    async fn test_copy_into_folder() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(302))
            .respond(HttpResponse::new(400).with_header("x-error", "A job already exists with the name ?copy?"));
        let client = client(&transport);

        client.job().copy("source", "folder/copy").await.unwrap();
        assert_eq!(
            transport.last_request().url,
            "http://localhost:8080/job/folder/createItem?name=copy&from=source&mode=copy"
        );

        let err = client.job().copy("source", "folder/copy").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "job.copy: A job already exists with the name \"copy\""
        );
    }

    #[tokio::test]
    async fn test_create() {
        let transport = ScriptedTransport::new().respond(HttpResponse::new(200));
        let client = client(&transport);

        client.job().create("test", "<project/>").await.unwrap();
        let request = transport.last_request();
        assert_eq!(request.url, "http://localhost:8080/createItem?name=test");
        assert_eq!(request.body.as_deref(), Some(&b"<project/>"[..]));

        let err = client.job().create("test", "").await.unwrap_err();
        assert_eq!(err.to_string(), "job.create: xml required");
    }

    #[tokio::test]
    async fn test_destroy_disable_enable() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(302))
            .respond(HttpResponse::new(302))
            .respond(HttpResponse::new(302))
            .respond(HttpResponse::new(200));
        let client = client(&transport);

        client.job().destroy("a/b").await.unwrap();
        client.job().disable("a/b").await.unwrap();
        client.job().enable("a/b").await.unwrap();

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:8080/job/a/job/b/doDelete",
                "http://localhost:8080/job/a/job/b/disable",
                "http://localhost:8080/job/a/job/b/enable",
            ]
        );

        let err = client.job().delete("a/b").await.unwrap_err();
        assert_eq!(err.to_string(), "job.destroy: failed to delete: a/b");
    }

    #[tokio::test]
    async fn test_exists_is_stable() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200))
            .respond(HttpResponse::new(200))
            .respond(HttpResponse::new(404));
        let client = client(&transport);

        assert!(client.job().exists("test").await.unwrap());
        assert!(client.job().exists("test").await.unwrap());
        assert!(!client.job().exists("other").await.unwrap());
        assert_eq!(transport.last_request().method, Method::HEAD);
    }

    #[tokio::test]
    async fn test_get() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_json(&json!({ "name": "x" })))
            .respond(HttpResponse::new(404));
        let client = client(&transport);

        let job = client.job().get("x", ReadOptions::new()).await.unwrap();
        assert_eq!(job["name"], "x");
        assert_eq!(transport.last_request().url, "http://localhost:8080/job/x/api/json?depth=0");

        let err = client.job().get("test", ReadOptions::new()).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "job.get: test not found");
    }

    #[tokio::test]
    async fn test_get_by_url() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_json(&json!({ "name": "b c" })));
        let client = client(&transport);

        client
            .job()
            .get("http://localhost:8080/job/a/job/b%20c/", ReadOptions::new())
            .await
            .unwrap();
        assert_eq!(
            transport.last_request().url,
            "http://localhost:8080/job/a/job/b%20c/api/json?depth=0"
        );
    }

    #[tokio::test]
    async fn test_required_name() {
        let transport = ScriptedTransport::new();
        let client = client(&transport);

        let err = client.job().get("/", ReadOptions::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "job.get: name required");

        let err = client.job().copy("", "b").await.unwrap_err();
        assert_eq!(err.to_string(), "job.copy: from required");

        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_list() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_json(&json!({ "jobs": [{ "name": "a" }, { "name": "b" }] })))
            .respond(HttpResponse::new(200).with_json(&json!({ "jobs": [] })))
            .respond(HttpResponse::new(200).with_json(&json!({ "jobs": { "name": "a" } })));
        let client = client(&transport);

        let jobs = client.job().list("", ReadOptions::new()).await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(transport.last_request().url, "http://localhost:8080/api/json");

        let jobs = client.job().list("folder", ReadOptions::new()).await.unwrap();
        assert!(jobs.is_empty());
        assert_eq!(transport.last_request().url, "http://localhost:8080/job/folder/api/json");

        let err = client.job().list("", ReadOptions::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "job.list: returned bad data");
    }
}
