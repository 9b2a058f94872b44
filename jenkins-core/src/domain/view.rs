//! View domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of view that can be created through `/createView`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    #[default]
    List,
    My,
}

impl ViewKind {
    /// Server-side implementation class submitted as the view `mode`
    pub fn class_name(self) -> &'static str {
        match self {
            ViewKind::List => "hudson.model.ListView",
            ViewKind::My => "hudson.model.MyView",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::List => write!(f, "list"),
            ViewKind::My => write!(f, "my"),
        }
    }
}

/// Error returned when a view kind name is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownViewKind(pub String);

impl fmt::Display for UnknownViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type unknown: {}", self.0)
    }
}

impl std::error::Error for UnknownViewKind {}

impl FromStr for ViewKind {
    type Err = UnknownViewKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(ViewKind::List),
            "my" => Ok(ViewKind::My),
            other => Err(UnknownViewKind(other.to_string())),
        }
    }
}
