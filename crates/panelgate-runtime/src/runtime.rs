//! Bootstrap and event dispatch.
//!
//! The runtime owns the host adapter, the page window, the role directory
//! and the approval workflow, and moves through three phases:
//!
//!   AwaitingPanel → (panel found) → Degraded | Active
//!
//! On attach it waits the configured initial delay, reads the signed-in
//! email, and either disables the panel (nobody signed in) or resolves the
//! role, applies the rules, injects the badge and installs the re-render
//! watcher. Rules, badge and watcher are all sequenced after resolution.
//! Workflow intents and cross-context messages are handled in both the
//! degraded and the active phase.

use serde_json::Value;
use tracing::{debug, info, warn};

use panelgate_contracts::{
    error::{GateError, GateResult},
    role::Role,
};
use panelgate_core::{
    search_scope,
    traits::{KeyValueStore, PageWindow, PanelHost, RoleDirectory},
    Selector,
};
use panelgate_policy::{RerenderWatcher, RuleEngine};
use panelgate_workflow::{ApprovalWorkflow, PublishDecision};

use crate::config::RuntimeConfig;
use crate::identity::read_user_email;

// ── Events ────────────────────────────────────────────────────────────────────

/// A workflow intent raised by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Edit,
    Preview,
    PublishLive,
}

impl Intent {
    pub const ALL: [Intent; 3] = [Intent::Edit, Intent::Preview, Intent::PublishLive];

    /// The host event name carrying this intent.
    pub fn event_name(self) -> &'static str {
        match self {
            Intent::Edit => "custom:eds-edit",
            Intent::Preview => "custom:eds-preview",
            Intent::PublishLive => "custom:eds-publish-live",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|intent| intent.event_name() == name)
    }
}

/// Something the host or the page told the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The host signalled that its panel is in the document.
    Ready,
    /// Structural change may have happened under the panel.
    Changed,
    Intent(Intent),
    /// A message from another window context.
    Message { origin: String, data: Value },
}

/// What handling one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The event did not apply in the current phase, or had no effect.
    Ignored,
    /// The panel was found and the runtime left `AwaitingPanel`.
    Attached,
    /// The watcher saw structural change and re-applied the rules.
    Reapplied,
    EditNoticeShown,
    PreviewOpened { url: String },
    Publish(PublishDecision),
    /// A state reply was posted to the requesting origin.
    Replied,
}

// ── Phases ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase<N> {
    /// No panel in the document yet.
    AwaitingPanel,
    /// Panel found but nobody is signed in; interactive controls are dimmed.
    Degraded { panel: N },
    /// Role resolved and applied.
    Active { panel: N, role: Role },
}

// ── Runtime ───────────────────────────────────────────────────────────────────

/// Wires identity, role resolution, rules and workflow to one host panel.
pub struct Runtime<H: PanelHost, W, D, S> {
    host: H,
    window: W,
    directory: D,
    engine: RuleEngine,
    workflow: ApprovalWorkflow<S>,
    panel_marker: Selector,
    initial_delay: std::time::Duration,
    phase: Phase<H::Node>,
    watcher: Option<RerenderWatcher<H::Node>>,
}

impl<H, W, D, S> Runtime<H, W, D, S>
where
    H: PanelHost,
    W: PageWindow,
    D: RoleDirectory,
    S: KeyValueStore,
{
    /// Build a runtime from its adapters and `config`.
    ///
    /// Fails only on invalid configuration (a selector that does not parse).
    pub fn new(host: H, window: W, directory: D, store: S, config: &RuntimeConfig) -> GateResult<Self> {
        let engine = RuleEngine::new(&config.rules)?;
        let panel_marker = Selector::parse(&config.panel_marker).map_err(|e| GateError::Config {
            reason: format!("panel_marker: {e}"),
        })?;
        Ok(Self {
            host,
            window,
            directory,
            engine,
            workflow: ApprovalWorkflow::new(store, config.workflow.clone()),
            panel_marker,
            initial_delay: config.initial_delay(),
            phase: Phase::AwaitingPanel,
            watcher: None,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, for driving it from outside (tests, demo).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn workflow(&self) -> &ApprovalWorkflow<S> {
        &self.workflow
    }

    pub fn phase(&self) -> &Phase<H::Node> {
        &self.phase
    }

    /// The resolved role, once active.
    pub fn role(&self) -> Option<Role> {
        match self.phase {
            Phase::Active { role, .. } => Some(role),
            _ => None,
        }
    }

    /// Number of re-application passes the watcher has run.
    pub fn reapply_passes(&self) -> usize {
        self.watcher.as_ref().map_or(0, RerenderWatcher::passes)
    }

    /// Attach to the panel if it is already in the document; otherwise wait
    /// for [`HostEvent::Ready`].
    pub async fn start(&mut self) -> &Phase<H::Node> {
        match self.find_panel() {
            Some(panel) => self.attach(panel).await,
            None => info!(marker = %self.panel_marker, "panel not present yet; waiting for readiness"),
        }
        &self.phase
    }

    /// Dispatch one event.
    pub async fn handle(&mut self, event: HostEvent) -> Outcome {
        match event {
            HostEvent::Ready => self.on_ready().await,
            HostEvent::Changed => self.on_changed(),
            HostEvent::Intent(intent) => self.on_intent(intent),
            HostEvent::Message { origin, data } => self.on_message(&origin, &data),
        }
    }

    // ── Attach ────────────────────────────────────────────────────────────────

    fn find_panel(&self) -> Option<H::Node> {
        search_scope(&self.host, Some(self.host.document_root()), &self.panel_marker)
            .into_iter()
            .next()
    }

    async fn attach(&mut self, panel: H::Node) {
        let Some(panel_root) = self.host.nested_root(panel) else {
            warn!("panel exposes no nested root; nothing to govern");
            self.phase = Phase::Degraded { panel };
            return;
        };

        if !self.initial_delay.is_zero() {
            tokio::time::sleep(self.initial_delay).await;
        }

        let email = read_user_email(
            &self.host,
            panel_root,
            self.engine.user_item(),
            self.engine.user_description(),
        );
        let Some(email) = email else {
            self.engine.disable_panel(&mut self.host, panel_root);
            self.phase = Phase::Degraded { panel };
            return;
        };

        let role = self.directory.resolve_role(&email).await;
        self.engine.apply_role(&mut self.host, panel_root, role);
        self.engine.inject_badge(&mut self.host, panel_root, role);
        self.watcher = Some(RerenderWatcher::install(&mut self.host, panel_root, role));

        debug!(email = %email, "signed-in user resolved");
        info!(role = %role, "panel governed");
        self.phase = Phase::Active { panel, role };
    }

    // ── Event handlers ────────────────────────────────────────────────────────

    async fn on_ready(&mut self) -> Outcome {
        if self.phase != Phase::AwaitingPanel {
            debug!("readiness signalled again; already attached");
            return Outcome::Ignored;
        }
        match self.find_panel() {
            Some(panel) => {
                self.attach(panel).await;
                Outcome::Attached
            }
            None => {
                warn!(marker = %self.panel_marker, "readiness signalled but no panel found");
                Outcome::Ignored
            }
        }
    }

    fn on_changed(&mut self) -> Outcome {
        let Some(watcher) = self.watcher.as_mut() else {
            return Outcome::Ignored;
        };
        if watcher.on_change(&self.engine, &mut self.host) {
            Outcome::Reapplied
        } else {
            Outcome::Ignored
        }
    }

    fn on_intent(&mut self, intent: Intent) -> Outcome {
        if self.phase == Phase::AwaitingPanel {
            debug!(intent = intent.event_name(), "intent before attach; ignored");
            return Outcome::Ignored;
        }
        match intent {
            Intent::Edit => {
                self.workflow.edit_notice(&self.window);
                Outcome::EditNoticeShown
            }
            Intent::Preview => Outcome::PreviewOpened {
                url: self.workflow.open_preview(&self.window),
            },
            Intent::PublishLive => Outcome::Publish(self.workflow.request_publish(&self.window)),
        }
    }

    fn on_message(&mut self, origin: &str, data: &Value) -> Outcome {
        if self.phase == Phase::AwaitingPanel {
            return Outcome::Ignored;
        }
        let location = self.window.location();
        match self.workflow.handle_message(origin, data, &location) {
            Some(reply) => {
                self.window.post_message(reply);
                Outcome::Replied
            }
            None => Outcome::Ignored,
        }
    }
}
