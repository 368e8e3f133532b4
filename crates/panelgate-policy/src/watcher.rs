//! Re-applies rules after the host re-renders its panel.
//!
//! The host may replace its internal nodes at any time without telling the
//! overlay, which silently discards earlier hides. The watcher treats any
//! structural change under the panel root as a reason to re-apply the rules
//! for the role captured at install time. It never inspects batch contents.

use tracing::debug;

use panelgate_contracts::role::Role;
use panelgate_core::traits::{ObserverId, PanelHost};

use crate::engine::RuleEngine;

/// One subscription to structural change under a panel root.
///
/// Lives as long as the page; there is no teardown.
#[derive(Debug)]
pub struct RerenderWatcher<N> {
    role: Role,
    panel_root: N,
    observer: ObserverId,
    passes: usize,
}

impl<N: Copy> RerenderWatcher<N> {
    /// Subscribe to changes under `panel_root`, capturing `role`.
    pub fn install<H: PanelHost<Node = N>>(host: &mut H, panel_root: N, role: Role) -> Self {
        let observer = host.observe(panel_root);
        debug!(role = %role, observer = observer.0, "re-render watcher installed");
        Self {
            role,
            panel_root,
            observer,
            passes: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Number of re-application passes triggered so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Drain the pending batch; if it is non-empty, re-apply the rules.
    ///
    /// Returns true if rules were re-applied.
    pub fn on_change<H: PanelHost<Node = N>>(&mut self, engine: &RuleEngine, host: &mut H) -> bool {
        let batch = host.take_mutations(self.observer);
        if batch.is_empty() {
            return false;
        }
        let report = engine.apply_role(host, self.panel_root, self.role);
        self.passes += 1;
        debug!(
            changes = batch.len(),
            hidden = report.hidden,
            pass = self.passes,
            "panel re-rendered; rules re-applied"
        );
        true
    }
}
