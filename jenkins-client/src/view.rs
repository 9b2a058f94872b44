//! View endpoints

use serde_json::{Value, json};
use tracing::debug;

use jenkins_core::domain::view::ViewKind;
use jenkins_core::dto::options::ReadOptions;

use crate::JenkinsClient;
use crate::error::{ClientError, Result};
use crate::middleware::{self, Pipeline};
use crate::path::FolderPath;
use crate::request::{RequestBody, RequestDescriptor};

/// Operations on top-level views
#[derive(Debug, Clone, Copy)]
pub struct ViewClient<'a> {
    client: &'a JenkinsClient,
}

impl<'a> ViewClient<'a> {
    pub(crate) fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    /// Create a view
    pub async fn create(&self, name: &str, kind: ViewKind) -> Result<()> {
        debug!(name, %kind, "view.create");
        required(name, "view.create")?;

        let mode = kind.class_name();
        let fields = vec![
            ("name".to_string(), name.to_string()),
            ("mode".to_string(), mode.to_string()),
            (
                "json".to_string(),
                json!({ "name": name, "mode": mode }).to_string(),
            ),
        ];

        let req =
            RequestDescriptor::post("view.create", "/createView").body(RequestBody::Form(fields));

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::require_302(&format!("failed to create: {name}")))
                    .then(middleware::empty()),
            )
            .await
    }

    /// Get a view's `config.xml`
    pub async fn config(&self, name: &str) -> Result<String> {
        debug!(name, "view.config");
        required(name, "view.config")?;

        let req =
            RequestDescriptor::get("view.config", "/view/{name}/config.xml").param("name", name);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(name))
                    .then(middleware::text()),
            )
            .await
    }

    /// Replace a view's `config.xml`
    pub async fn set_config(&self, name: &str, xml: &str) -> Result<()> {
        debug!(name, "view.config");
        required(name, "view.config")?;

        if xml.is_empty() {
            return Err(ClientError::validation("xml required").in_operation("view.config"));
        }

        let req = RequestDescriptor::post("view.config", "/view/{name}/config.xml")
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

    /// Delete a view
    pub async fn destroy(&self, name: &str) -> Result<()> {
        debug!(name, "view.destroy");
        required(name, "view.destroy")?;

        let req =
            RequestDescriptor::post("view.destroy", "/view/{name}/doDelete").param("name", name);

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

    pub async fn exists(&self, name: &str) -> Result<bool> {
        debug!(name, "view.exists");
        required(name, "view.exists")?;

        let req =
            RequestDescriptor::head("view.exists", "/view/{name}/api/json").param("name", name);

        self.client
            .request(req, Pipeline::new().then(middleware::exists()))
            .await
    }

    /// Get a view; depth defaults to 0
    pub async fn get(&self, name: &str, options: ReadOptions) -> Result<Value> {
        let options = options.depth_or(0);
        debug!(name, ?options, "view.get");
        required(name, "view.get")?;

        let req = RequestDescriptor::get("view.get", "/view/{name}/api/json")
            .param("name", name)
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

    /// List top-level views
    pub async fn list(&self, options: ReadOptions) -> Result<Vec<Value>> {
        debug!(?options, "view.list");

        let req = RequestDescriptor::get("view.list", "/api/json").read_options(&options);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::require_array("views"))
                    .then(middleware::body_item("views")),
            )
            .await
    }

    /// Add a job to a view
    pub async fn add(&self, name: &str, job: impl Into<FolderPath>) -> Result<()> {
        self.membership(name, job.into(), "view.add", "addJobToView")
            .await
    }

    /// Remove a job from a view
    pub async fn remove(&self, name: &str, job: impl Into<FolderPath>) -> Result<()> {
        self.membership(name, job.into(), "view.remove", "removeJobFromView")
            .await
    }

    async fn membership(
        &self,
        name: &str,
        job: FolderPath,
        operation: &str,
        action: &str,
    ) -> Result<()> {
        debug!(name, %job, "{operation}");
        required(name, operation)?;
        let job = job
            .required()
            .map_err(|_| ClientError::validation("job required").in_operation(operation))?;

        let req = RequestDescriptor::post(operation, format!("/view/{{name}}/{action}"))
            .param("name", name)
            .query("name", job.to_string());

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(name))
                    .then(middleware::empty()),
            )
            .await
    }
}

fn required(name: &str, operation: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ClientError::validation("name required").in_operation(operation));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::test_support::ScriptedTransport;
    use crate::transport::HttpResponse;
    use reqwest::Method;

    fn client(transport: &ScriptedTransport) -> JenkinsClient {
        JenkinsClient::with_transport(ClientConfig::default(), transport.clone())
    }

    #[tokio::test]
    async fn test_create() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(302))
            .respond(HttpResponse::new(400).with_header("x-error", "A view already exists with the name ?ci?"));
        let client = client(&transport);

        client.view().create("ci", ViewKind::List).await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.url, "http://localhost:8080/createView");
        let body = String::from_utf8(request.body.unwrap().to_vec()).unwrap();
        let fields: Vec<(String, String)> = url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(fields[0], ("name".to_string(), "ci".to_string()));
        assert_eq!(fields[1], ("mode".to_string(), "hudson.model.ListView".to_string()));
        let json: Value = serde_json::from_str(&fields[2].1).unwrap();
        assert_eq!(json["mode"], "hudson.model.ListView");

        let err = client.view().create("ci", ViewKind::My).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "view.create: A view already exists with the name \"ci\""
        );
    }

    #[tokio::test]
    async fn test_get_and_exists() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_json(&json!({ "name": "ci", "jobs": [] })))
            .respond(HttpResponse::new(404))
            .respond(HttpResponse::new(404));
        let client = client(&transport);

        let view = client.view().get("ci", ReadOptions::new()).await.unwrap();
        assert_eq!(view["name"], "ci");
        assert_eq!(
            transport.last_request().url,
            "http://localhost:8080/view/ci/api/json?depth=0"
        );

        assert!(!client.view().exists("gone").await.unwrap());

        let err = client.view().get("gone", ReadOptions::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "view.get: gone not found");
    }

    #[tokio::test]
    async fn test_config_and_destroy() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_body("<listView/>"))
            .respond(HttpResponse::new(200))
            .respond(HttpResponse::new(302));
        let client = client(&transport);

        assert_eq!(client.view().config("ci").await.unwrap(), "<listView/>");
        client.view().set_config("ci", "<listView></listView>").await.unwrap();
        assert_eq!(transport.last_request().method, Method::POST);

        client.view().destroy("ci").await.unwrap();
        assert_eq!(transport.last_request().url, "http://localhost:8080/view/ci/doDelete");
    }

    #[tokio::test]
    async fn test_list() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200).with_json(&json!({ "views": [{ "name": "all" }] })))
            .respond(HttpResponse::new(200).with_json(&json!({ "jobs": [] })));
        let client = client(&transport);

        let views = client.view().list(ReadOptions::new()).await.unwrap();
        assert_eq!(views[0]["name"], "all");

        let err = client.view().list(ReadOptions::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "view.list: returned bad data");
    }

    #[tokio::test]
    async fn test_add_and_remove() {
        let transport = ScriptedTransport::new()
            .respond(HttpResponse::new(200))
            .respond(HttpResponse::new(200));
        let client = client(&transport);

        client.view().add("ci", "folder/test").await.unwrap();
        assert_eq!(
            transport.last_request().url,
            "http://localhost:8080/view/ci/addJobToView?name=folder%2Ftest"
        );

        client.view().remove("ci", "test").await.unwrap();
        assert_eq!(
            transport.last_request().url,
            "http://localhost:8080/view/ci/removeJobFromView?name=test"
        );

        let err = client.view().add("ci", "").await.unwrap_err();
        assert_eq!(err.to_string(), "view.add: job required");
    }
}
