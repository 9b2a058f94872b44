//! Credentials endpoints
//!
//! Credentials live in a domain of a store owned by a folder. The folder name `manage`
//! addresses the system-wide store at `/manage/credentials/...`.

use serde_json::Value;
use tracing::debug;

use jenkins_core::dto::credentials::CredentialScope;

use crate::JenkinsClient;
use crate::error::{ClientError, Result};
use crate::middleware::{self, Pipeline};
use crate::path::FolderPath;
use crate::request::{PathParam, RequestBody, RequestDescriptor};

const STORE: &str = "{folder}/credentials/store/{store}/domain/{domain}";
const CREDENTIAL: &str = "{folder}/credentials/store/{store}/domain/{domain}/credential/{id}";

/// Operations on stored credentials
#[derive(Debug, Clone, Copy)]
pub struct CredentialsClient<'a> {
    client: &'a JenkinsClient,
}

impl<'a> CredentialsClient<'a> {
    pub(crate) fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    /// Get a credential's `config.xml`
    pub async fn config(&self, id: &str, scope: &CredentialScope) -> Result<String> {
        debug!(id, ?scope, "credentials.config");
        required_id(id, "credentials.config")?;

        let req = store_request(
            RequestDescriptor::get("credentials.config", format!("{CREDENTIAL}/config.xml")),
            scope,
        )?
        .param("id", id);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(id))
                    .then(middleware::text()),
            )
            .await
    }

    /// Replace a credential's `config.xml`
    pub async fn set_config(&self, id: &str, scope: &CredentialScope, xml: &str) -> Result<()> {
        debug!(id, ?scope, "credentials.config");
        required_id(id, "credentials.config")?;
        required_xml(xml, "credentials.config")?;

        let req = store_request(
            RequestDescriptor::post("credentials.config", format!("{CREDENTIAL}/config.xml")),
            scope,
        )?
        .param("id", id)
        .body(RequestBody::xml(xml));

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(id))
                    .then(middleware::empty()),
            )
            .await
    }

    /// Create a credential from its XML description
    pub async fn create(&self, scope: &CredentialScope, xml: &str) -> Result<()> {
        debug!(?scope, "credentials.create");
        required_xml(xml, "credentials.create")?;

        let req = store_request(
            RequestDescriptor::post("credentials.create", format!("{STORE}/createCredentials")),
            scope,
        )?
        .body(RequestBody::xml(xml));

        self.client
            .request(req, Pipeline::new().then(middleware::empty()))
            .await
    }

    pub async fn exists(&self, id: &str, scope: &CredentialScope) -> Result<bool> {
        debug!(id, ?scope, "credentials.exists");
        required_id(id, "credentials.exists")?;

        let req = store_request(
            RequestDescriptor::head("credentials.exists", format!("{CREDENTIAL}/api/json")),
            scope,
        )?
        .param("id", id);

        self.client
            .request(req, Pipeline::new().then(middleware::exists()))
            .await
    }

    pub async fn destroy(&self, id: &str, scope: &CredentialScope) -> Result<()> {
        debug!(id, ?scope, "credentials.destroy");
        required_id(id, "credentials.destroy")?;

        let req = store_request(
            RequestDescriptor::delete("credentials.destroy", format!("{CREDENTIAL}/config.xml")),
            scope,
        )?
        .param("id", id);

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::not_found(id))
                    .then(middleware::empty()),
            )
            .await
    }

    /// List the ids of the credentials in a domain
    pub async fn list(&self, scope: &CredentialScope) -> Result<Vec<Value>> {
        debug!(?scope, "credentials.list");

        let req = store_request(
            RequestDescriptor::get("credentials.list", format!("{STORE}/api/json")),
            scope,
        )?
        .query("tree", "credentials[id]");

        self.client
            .request(
                req,
                Pipeline::new()
                    .then(middleware::require_array("credentials"))
                    .then(middleware::body_item("credentials")),
            )
            .await
    }
}

/// Fills the folder, store and domain placeholders
fn store_request(req: RequestDescriptor, scope: &CredentialScope) -> Result<RequestDescriptor> {
    let operation = req.name.clone();

    let folder = if scope.is_system() {
        PathParam::Raw(format!("/{}", scope.folder.trim_matches('/')))
    } else {
        FolderPath::parse(&scope.folder)
            .required()
            .map_err(|_| ClientError::validation("folder required").in_operation(&operation))?
            .path()
    };

    if scope.store.is_empty() {
        return Err(ClientError::validation("store required").in_operation(operation));
    }
    if scope.domain.is_empty() {
        return Err(ClientError::validation("domain required").in_operation(operation));
    }

    Ok(req
        .param("folder", folder)
        .param("store", scope.store.as_str())
        .param("domain", scope.domain.as_str()))
}

fn required_id(id: &str, operation: &str) -> Result<()> {
    if id.is_empty() {
        return Err(ClientError::validation("id required").in_operation(operation));
    }
    Ok(())
}

fn required_xml(xml: &str, operation: &str) -> Result<()> {
    if xml.is_empty() {
        return Err(ClientError::validation("xml required").in_operation(operation));
    }
    Ok(())
}
