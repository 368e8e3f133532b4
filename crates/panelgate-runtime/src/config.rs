//! Top-level runtime configuration.
//!
//! One TOML document configures every component. All sections and fields
//! are optional.
//!
//! ```toml
//! panel_marker = "aem-sidekick"
//! initial_delay_ms = 600
//!
//! [directory]
//! url = "https://example.com/roles.csv"
//!
//! [rules]
//! mode = "hide-only"
//!
//! [workflow]
//! allowed_origins = ["https://palette.example.com"]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use panelgate_contracts::error::{GateError, GateResult};
use panelgate_directory::DirectoryConfig;
use panelgate_policy::RulesConfig;
use panelgate_workflow::WorkflowConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Tag of the panel's top-level element.
    pub panel_marker: String,
    /// Wait between finding the panel and reading the signed-in user, so
    /// the host can finish rendering its user menu.
    pub initial_delay_ms: u64,
    pub directory: DirectoryConfig,
    pub rules: RulesConfig,
    pub workflow: WorkflowConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            panel_marker: "aem-sidekick".to_string(),
            initial_delay_ms: 600,
            directory: DirectoryConfig::default(),
            rules: RulesConfig::default(),
            workflow: WorkflowConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(s: &str) -> GateResult<Self> {
        toml::from_str(s).map_err(|e| GateError::Config {
            reason: format!("failed to parse runtime TOML: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> GateResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GateError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}
