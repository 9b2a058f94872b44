//! Build log domain types

use serde::{Deserialize, Serialize};

/// One chunk of progressive build log output
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogText {
    /// Log text starting at the requested offset
    pub text: String,
    /// Whether the build is still producing output
    pub more: bool,
    /// Offset to request next, when the server reported one
    pub size: Option<u64>,
}

/// Rendering of the progressive log endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogFormat {
    #[default]
    Text,
    Html,
}

impl LogFormat {
    /// Suffix appended to `logText/progressive`
    pub fn endpoint_suffix(self) -> &'static str {
        match self {
            LogFormat::Text => "Text",
            LogFormat::Html => "Html",
        }
    }
}
