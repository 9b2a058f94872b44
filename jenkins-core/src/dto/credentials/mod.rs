//! Credentials DTOs

use serde::{Deserialize, Serialize};

/// Folder name that addresses the system-wide credential store
pub const SYSTEM_FOLDER: &str = "manage";

/// Location of a credentials domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialScope {
    /// Folder path owning the store, or `manage` for the system store
    pub folder: String,
    /// Store name (`folder`, `system`)
    pub store: String,
    /// Domain name (`_` is the global domain)
    pub domain: String,
}

impl CredentialScope {
    pub fn new(
        folder: impl Into<String>,
        store: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            folder: folder.into(),
            store: store.into(),
            domain: domain.into(),
        }
    }

    /// The global domain of the system store
    pub fn system() -> Self {
        Self::new(SYSTEM_FOLDER, "system", "_")
    }

    pub fn is_system(&self) -> bool {
        self.folder.trim_matches('/') == SYSTEM_FOLDER
    }
}
