//! Rule configuration: which selectors name which controls, and how rules
//! are re-applied.
//!
//! Every field has a default matching the host panel, so an empty TOML
//! document is a valid configuration.
//!
//! Example in TOML:
//! ```toml
//! mode = "from-baseline"
//!
//! [controls]
//! preview = "sk-menu-item.env-preview"
//! interactive = ["sk-action-button", "button"]
//! ```

use serde::{Deserialize, Serialize};

/// How a rule pass treats controls the role is allowed to see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReapplyMode {
    /// Only ever hide. Controls of visible classes are left untouched, so a
    /// hide from an earlier pass with another role is never reverted.
    #[default]
    HideOnly,
    /// Recompute from an all-visible baseline: controls of visible classes
    /// are explicitly shown on every pass.
    FromBaseline,
}

/// Selectors for the controls the engine reads or governs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSelectors {
    /// Open-source / edit control.
    pub edit: String,
    /// Preview environment control.
    pub preview: String,
    /// Live environment / publish control.
    pub live: String,
    /// Brand mark the badge and the sign-in notice are appended to.
    pub brand_mark: String,
    /// The menu item describing the signed-in user.
    pub user_item: String,
    /// Within the user item's nested root: the element holding the email.
    pub user_description: String,
    /// Controls dimmed when nobody is signed in.
    pub interactive: Vec<String>,
    /// Controls inside an element matching this stay usable when dimming.
    pub sign_in_exempt: String,
}

impl Default for ControlSelectors {
    fn default() -> Self {
        Self {
            edit: "sk-menu-item.env-edit".to_string(),
            preview: "sk-menu-item.env-preview".to_string(),
            live: "sk-menu-item.env-live".to_string(),
            brand_mark: ".logo".to_string(),
            user_item: "sk-menu-item.user".to_string(),
            user_description: r#"span[slot="description"]"#.to_string(),
            interactive: ["sk-action-button", "sk-menu-item", "button", "sp-switch", "sk-action-menu"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sign_in_exempt: "login-button".to_string(),
        }
    }
}

/// The top-level rule configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub mode: ReapplyMode,
    pub controls: ControlSelectors,
}
