//! Workflow configuration.
//!
//! Example in TOML:
//! ```toml
//! storage_key = "eds-approval-state"
//! allowed_origins = ["https://palette.example.com"]
//! ```

use serde::{Deserialize, Serialize};

/// Store key, URL markers and the cross-context origin allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// The single store key holding the path → record map.
    pub storage_key: String,
    /// Host marker of preview URLs.
    pub preview_marker: String,
    /// Host marker of live URLs.
    pub live_marker: String,
    /// Origins allowed to query workflow state. Empty means nobody is.
    pub allowed_origins: Vec<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            storage_key: "eds-approval-state".to_string(),
            preview_marker: ".page".to_string(),
            live_marker: ".live".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}
