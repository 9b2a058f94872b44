//! Request descriptors
//!
//! Every operation describes its call as a [`RequestDescriptor`]: a path template with
//! `{placeholder}` tokens plus the parameters, query, headers and body needed to render it.

use bytes::Bytes;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use jenkins_core::dto::options::ReadOptions;

use crate::error::{ClientError, Result};
use crate::path::encode_component;
use crate::transport::HttpRequest;

/// Value substituted for a path placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathParam {
    /// Percent-encoded when rendered
    Value(String),
    /// Already encoded; inserted verbatim
    Raw(String),
}

impl PathParam {
    fn render(&self) -> String {
        match self {
            PathParam::Value(value) => encode_component(value),
            PathParam::Raw(value) => value.clone(),
        }
    }
}

impl From<&str> for PathParam {
    fn from(value: &str) -> Self {
        PathParam::Value(value.to_string())
    }
}

impl From<String> for PathParam {
    fn from(value: String) -> Self {
        PathParam::Value(value)
    }
}

impl From<u64> for PathParam {
    fn from(value: u64) -> Self {
        PathParam::Value(value.to_string())
    }
}

/// Request payload and its content encoding
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Raw {
        content_type: String,
        bytes: Bytes,
    },
    Form(Vec<(String, String)>),
    Json(Value),
}

impl RequestBody {
    /// XML document sent the way Jenkins expects config uploads
    pub fn xml(xml: impl Into<String>) -> Self {
        RequestBody::Raw {
            content_type: "text/xml; charset=utf-8".to_string(),
            bytes: Bytes::from(xml.into()),
        }
    }

    fn encode(&self) -> Option<(&str, Bytes)> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Raw {
                content_type,
                bytes,
            } => Some((content_type.as_str(), bytes.clone())),
            RequestBody::Form(fields) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields)
                    .finish();
                Some(("application/x-www-form-urlencoded", Bytes::from(encoded)))
            }
            RequestBody::Json(value) => {
                Some(("application/json", Bytes::from(value.to_string())))
            }
        }
    }
}

/// Description of a single call against the server
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub name: String,
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, PathParam)>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RequestDescriptor {
    pub fn new(name: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            params: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::GET, path)
    }

    pub fn post(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::POST, path)
    }

    pub fn head(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::HEAD, path)
    }

    pub fn delete(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::DELETE, path)
    }

    pub fn param(mut self, name: &str, value: impl Into<PathParam>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Adds `depth` and `tree` when set; absent values add nothing
    pub fn read_options(self, options: &ReadOptions) -> Self {
        self.query_opt("depth", options.depth)
            .query_opt("tree", options.tree.as_deref())
    }

    /// Whether a CSRF crumb must accompany this request
    pub fn is_mutating(&self) -> bool {
        matches!(
            self.method,
            Method::POST | Method::PUT | Method::DELETE | Method::PATCH
        )
    }

    /// Substitutes every `{placeholder}` in the path template
    pub fn render_path(&self) -> Result<String> {
        let mut rendered = String::with_capacity(self.path.len());
        let mut rest = self.path.as_str();

        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                ClientError::validation(format!("unclosed placeholder in {}", self.path))
            })?;
            let key = &after[..close];

            let value = self
                .params
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value)
                .ok_or_else(|| ClientError::validation(format!("{key} required")))?;

            rendered.push_str(&value.render());
            rest = &after[close + 1..];
        }

        rendered.push_str(rest);
        Ok(rendered)
    }

    /// Absolute URL for this request under `base_url`
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let path = self.render_path()?;
        let base = base_url.trim_end_matches('/');

        let mut url = Url::parse(&format!("{base}{path}"))
            .map_err(|e| ClientError::validation(format!("invalid url: {e}")))?;

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        Ok(url)
    }

    /// Renders the transport-level request
    pub fn to_http_request(
        &self,
        base_url: &str,
        default_headers: &[(String, String)],
    ) -> Result<HttpRequest> {
        let url = self.url(base_url)?;

        let mut headers: Vec<(String, String)> = default_headers.to_vec();
        for (name, value) in &self.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        let body = match self.body.encode() {
            Some((content_type, bytes)) => {
                if !headers
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
                {
                    headers.push(("content-type".to_string(), content_type.to_string()));
                }
                Some(bytes)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: self.method.clone(),
            url: url.to_string(),
            headers,
            body,
        })
    }
}
