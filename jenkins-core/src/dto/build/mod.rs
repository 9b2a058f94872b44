//! Build DTOs

use serde::{Deserialize, Serialize};

use crate::domain::log::LogFormat;

/// Default delay between two log polls, in milliseconds
pub const DEFAULT_LOG_POLL_DELAY_MS: u64 = 1000;

/// Options for a single progressive log request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLogOptions {
    /// Byte offset to start reading from
    pub start: Option<u64>,
    pub format: LogFormat,
}

impl BuildLogOptions {
    pub fn from_offset(start: u64) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }
}

/// Options for a polling log stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStreamOptions {
    /// Delay between polls in milliseconds; the client's configured delay when unset
    pub delay_ms: Option<u64>,
    pub format: LogFormat,
}

impl LogStreamOptions {
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}
