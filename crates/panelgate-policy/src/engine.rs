//! The rule engine: applies a role's visibility mapping to the panel.
//!
//! Application algorithm:
//!
//! 1. For each control class, find its controls under the panel root with
//!    deep traversal.
//! 2. Hide every control whose class the role's `Visibility` excludes.
//! 3. In `from-baseline` mode only: un-hide every other governed control.
//!    In `hide-only` mode they are left as they are.
//!
//! Hiding is a style change, not a structural one, so applying rules never
//! wakes the re-render watcher. Applying the same role twice leaves the
//! panel exactly as applying it once.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use panelgate_contracts::{
    error::{GateError, GateResult},
    message::Marker,
    role::Role,
    visibility::{ControlClass, Visibility},
};
use panelgate_core::{closest, search, search_first, traits::PanelHost, Selector};

use crate::config::{ReapplyMode, RulesConfig};

/// What one rule pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Controls that were visible and are now hidden.
    pub hidden: usize,
    /// Controls that were hidden and are now visible (`from-baseline` only).
    pub shown: usize,
}

/// Applies visibility rules, badges, and degraded-mode dimming to a panel.
///
/// Construct via `new`, `from_toml_str` or `from_file`. Selectors are
/// validated once at construction.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    mode: ReapplyMode,
    edit: Selector,
    preview: Selector,
    live: Selector,
    brand_mark: Selector,
    user_item: Selector,
    user_description: Selector,
    interactive: Vec<Selector>,
    sign_in_exempt: Selector,
}

impl RuleEngine {
    /// Build an engine from `config`.
    ///
    /// Returns `GateError::Config` naming the first selector that does not parse.
    pub fn new(config: &RulesConfig) -> GateResult<Self> {
        let c = &config.controls;
        Ok(Self {
            mode: config.mode,
            edit: compile("edit", &c.edit)?,
            preview: compile("preview", &c.preview)?,
            live: compile("live", &c.live)?,
            brand_mark: compile("brand_mark", &c.brand_mark)?,
            user_item: compile("user_item", &c.user_item)?,
            user_description: compile("user_description", &c.user_description)?,
            interactive: c
                .interactive
                .iter()
                .map(|s| compile("interactive", s))
                .collect::<GateResult<_>>()?,
            sign_in_exempt: compile("sign_in_exempt", &c.sign_in_exempt)?,
        })
    }

    /// Parse `s` as TOML rule configuration and build an engine.
    pub fn from_toml_str(s: &str) -> GateResult<Self> {
        let config: RulesConfig = toml::from_str(s).map_err(|e| GateError::Config {
            reason: format!("failed to parse rules TOML: {}", e),
        })?;
        Self::new(&config)
    }

    /// Read the file at `path` and parse it as TOML rule configuration.
    pub fn from_file(path: &Path) -> GateResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GateError::Config {
            reason: format!("failed to read rules file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn mode(&self) -> ReapplyMode {
        self.mode
    }

    /// The selector naming controls of `class`.
    pub fn selector(&self, class: ControlClass) -> &Selector {
        match class {
            ControlClass::Edit => &self.edit,
            ControlClass::Preview => &self.preview,
            ControlClass::Live => &self.live,
        }
    }

    pub fn user_item(&self) -> &Selector {
        &self.user_item
    }

    pub fn user_description(&self) -> &Selector {
        &self.user_description
    }

    /// Apply `role`'s visibility mapping to the controls under `panel_root`.
    pub fn apply_role<H: PanelHost>(&self, host: &mut H, panel_root: H::Node, role: Role) -> ApplyReport {
        let visibility = Visibility::for_role(role);

        let mut excluded = HashSet::new();
        let mut allowed = Vec::new();
        for class in ControlClass::ALL {
            let controls = search(&*host, Some(panel_root), self.selector(class));
            if visibility.shows(class) {
                allowed.extend(controls);
            } else {
                excluded.extend(controls);
            }
        }

        let mut report = ApplyReport::default();
        for node in &excluded {
            if !host.is_hidden(*node) {
                host.set_hidden(*node, true);
                report.hidden += 1;
            }
        }
        if self.mode == ReapplyMode::FromBaseline {
            for node in allowed.into_iter().filter(|n| !excluded.contains(n)) {
                if host.is_hidden(node) {
                    host.set_hidden(node, false);
                    report.shown += 1;
                }
            }
        }

        debug!(
            role = %role,
            hidden = report.hidden,
            shown = report.shown,
            "visibility rules applied"
        );
        report
    }

    /// Append a role badge to the first brand mark under `panel_root`.
    ///
    /// Each call appends another badge. Returns `None` when the panel has no
    /// brand mark.
    pub fn inject_badge<H: PanelHost>(&self, host: &mut H, panel_root: H::Node, role: Role) -> Option<H::Node> {
        let Some(brand) = search_first(&*host, Some(panel_root), &self.brand_mark) else {
            warn!(selector = %self.brand_mark, "no brand mark found; badge not shown");
            return None;
        };
        let marker = Marker::badge(role.badge_label(), Some(role.badge_color()));
        Some(host.append_marker(brand, &marker))
    }

    /// Dim and block every interactive control under `panel_root`, except
    /// the ones needed to sign in, then show a sign-in notice.
    ///
    /// Returns the number of controls made inert.
    pub fn disable_panel<H: PanelHost>(&self, host: &mut H, panel_root: H::Node) -> usize {
        let mut disabled = 0;
        for selector in &self.interactive {
            for node in search(&*host, Some(panel_root), selector) {
                if closest(&*host, node, &self.sign_in_exempt).is_some() {
                    continue;
                }
                if !host.is_inert(node) {
                    host.make_inert(node);
                    disabled += 1;
                }
            }
        }

        if let Some(brand) = search_first(&*host, Some(panel_root), &self.brand_mark) {
            host.append_marker(brand, &Marker::sign_in_notice());
        }

        info!(disabled, "no signed-in user; panel disabled");
        disabled
    }
}

fn compile(field: &str, source: &str) -> GateResult<Selector> {
    Selector::parse(source).map_err(|e| GateError::Config {
        reason: format!("controls.{field}: {e}"),
    })
}
