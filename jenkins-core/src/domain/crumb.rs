//! CSRF crumb domain types

use serde::{Deserialize, Serialize};

/// Implementation class reported by the server's stock crumb issuer.
///
/// Only this issuer binds crumbs to the session cookie, so cookies are collected only
/// when the issuer reports this class.
pub const DEFAULT_CRUMB_ISSUER_CLASS: &str = "hudson.security.csrf.DefaultCrumbIssuer";

/// A CSRF-protection token to attach to a mutating request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    /// Request header that carries the crumb (e.g. `Jenkins-Crumb`)
    pub header_name: String,
    /// Crumb value
    pub header_value: String,
    /// `name=value` pairs of the session cookies the crumb is bound to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cookies: Vec<String>,
}

impl Crumb {
    pub fn new(header_name: impl Into<String>, header_value: impl Into<String>) -> Self {
        Self {
            header_name: header_name.into(),
            header_value: header_value.into(),
            cookies: Vec::new(),
        }
    }

    pub fn with_cookies(mut self, cookies: Vec<String>) -> Self {
        self.cookies = cookies;
        self
    }

    /// A crumb is usable only when both the header name and its value are present
    pub fn is_usable(&self) -> bool {
        !self.header_name.is_empty() && !self.header_value.is_empty()
    }
}

/// Body of `GET /crumbIssuer/api/json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrumbResponse {
    #[serde(rename = "_class", default)]
    pub class: Option<String>,
    #[serde(default)]
    pub crumb: Option<String>,
    #[serde(rename = "crumbRequestField", default)]
    pub crumb_request_field: Option<String>,
}

impl CrumbResponse {
    pub fn is_default_issuer(&self) -> bool {
        self.class.as_deref() == Some(DEFAULT_CRUMB_ISSUER_CLASS)
    }

    /// Converts the issuer response into a crumb, if both fields were returned
    pub fn into_crumb(self) -> Option<Crumb> {
        match (self.crumb_request_field, self.crumb) {
            (Some(name), Some(value)) if !name.is_empty() && !value.is_empty() => {
                Some(Crumb::new(name, value))
            }
            _ => None,
        }
    }
}
