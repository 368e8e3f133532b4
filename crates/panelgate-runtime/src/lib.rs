//! # panelgate-runtime
//!
//! Wires the overlay together: waits for the host panel, reads the
//! signed-in user, resolves a role through the directory, applies the
//! visibility rules and keeps them applied across re-renders, and routes
//! workflow intents and cross-context messages to the approval workflow.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use panelgate_runtime::{HostEvent, Runtime, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_file(Path::new("panelgate.toml"))?;
//! let mut runtime = Runtime::new(doc, window, directory, store, &config)?;
//! runtime.start().await;
//! runtime.handle(HostEvent::Changed).await;
//! ```

pub mod config;
pub mod identity;
pub mod runtime;

pub use config::RuntimeConfig;
pub use identity::read_user_email;
pub use runtime::{HostEvent, Intent, Outcome, Phase, Runtime};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;
    use url::Url;

    use panelgate_contracts::{
        approval::ApprovalStatus, error::GateError, message::Notice, role::Role, visibility::ControlClass,
    };
    use panelgate_core::{
        search,
        traits::{ElementView, PanelHost, RoleDirectory},
        Selector,
    };
    use panelgate_directory::{DirectoryClient, StaticTableSource};
    use panelgate_dom::{
        sample::{insert_panel, rerender_env_switcher, sample_panel, SamplePanel},
        Document, SimulatedWindow,
    };
    use panelgate_workflow::{MemoryStore, PublishDecision};

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const TABLE: &str = "email,role\n\
                         pub@example.com,publisher\n\
                         appr@example.com,approver\n";
    const HREF: &str = "https://main--site--org.page/docs/a.html";
    const PALETTE: &str = "https://palette.example.com";

    type TestRuntime = Runtime<Document, SimulatedWindow, DirectoryClient<StaticTableSource>, MemoryStore>;

    fn config() -> RuntimeConfig {
        let mut config = RuntimeConfig {
            initial_delay_ms: 0,
            ..RuntimeConfig::default()
        };
        config.workflow.allowed_origins = vec![PALETTE.to_string()];
        config
    }

    fn runtime_for(doc: Document) -> TestRuntime {
        runtime_with(doc, &config())
    }

    fn runtime_with(doc: Document, config: &RuntimeConfig) -> TestRuntime {
        Runtime::new(
            doc,
            SimulatedWindow::new(Url::parse(HREF).unwrap()),
            DirectoryClient::new(StaticTableSource(TABLE.to_string()), ','),
            MemoryStore::new(),
            config,
        )
        .unwrap()
    }

    async fn started(email: Option<&str>) -> (TestRuntime, SamplePanel) {
        let (doc, panel) = sample_panel(email);
        let mut runtime = runtime_for(doc);
        runtime.start().await;
        (runtime, panel)
    }

    fn shown(runtime: &TestRuntime, panel: &SamplePanel, class: ControlClass) -> bool {
        let doc = runtime.host();
        search(doc, Some(panel.panel_root), runtime.engine().selector(class))
            .iter()
            .all(|n| !doc.is_hidden(*n))
    }

    /// Counts resolutions and always answers `role`.
    struct CountingDirectory {
        role: Role,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RoleDirectory for CountingDirectory {
        async fn resolve_role(&self, _email: &str) -> Role {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.role
        }
    }

    // ── Identity ──────────────────────────────────────────────────────────────

    #[test]
    fn reads_email_from_nested_user_item() {
        let (doc, panel) = sample_panel(Some("  jane@example.com \n"));
        let item = Selector::parse("sk-menu-item.user").unwrap();
        let desc = Selector::parse(r#"span[slot="description"]"#).unwrap();
        assert_eq!(
            read_user_email(&doc, panel.panel_root, &item, &desc),
            Some("jane@example.com".to_string())
        );
    }

    #[test]
    fn text_without_at_sign_is_not_an_email() {
        let (doc, panel) = sample_panel(None);
        let item = Selector::parse("sk-menu-item.user").unwrap();
        let desc = Selector::parse(r#"span[slot="description"]"#).unwrap();
        assert_eq!(read_user_email(&doc, panel.panel_root, &item, &desc), None);
    }

    #[test]
    fn missing_user_item_means_not_signed_in() {
        let (doc, panel) = sample_panel(Some("jane@example.com"));
        let item = Selector::parse("sk-menu-item.account").unwrap();
        let desc = Selector::parse(r#"span[slot="description"]"#).unwrap();
        assert_eq!(read_user_email(&doc, panel.panel_root, &item, &desc), None);
    }

    // ── Bootstrap ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn signed_in_publisher_sees_everything_with_badge() {
        let (runtime, panel) = started(Some("pub@example.com")).await;

        assert_eq!(
            runtime.phase(),
            &Phase::Active {
                panel: panel.panel,
                role: Role::Publisher
            }
        );
        for class in ControlClass::ALL {
            assert!(shown(&runtime, &panel, class));
        }
        let badges = search(runtime.host(), Some(panel.panel_root), r#"div[data-marker="badge"]"#);
        assert_eq!(badges.len(), 1);
        assert_eq!(runtime.host().text_content(badges[0]), "PUBLISHER");
    }

    #[tokio::test]
    async fn unknown_user_resolves_to_author() {
        let (runtime, panel) = started(Some("someone@example.com")).await;
        assert_eq!(runtime.role(), Some(Role::Author));
        assert!(shown(&runtime, &panel, ControlClass::Edit));
        assert!(!shown(&runtime, &panel, ControlClass::Preview));
        assert!(!shown(&runtime, &panel, ControlClass::Live));
    }

    #[tokio::test]
    async fn not_signed_in_degrades_without_watcher() {
        let (mut runtime, panel) = started(None).await;

        assert_eq!(runtime.phase(), &Phase::Degraded { panel: panel.panel });
        assert_eq!(runtime.role(), None);
        assert!(!runtime.host().is_inert(panel.sign_in_button));
        let notices = search(runtime.host(), Some(panel.panel_root), r#"div[data-marker="notice"]"#);
        assert_eq!(notices.len(), 1);

        rerender_env_switcher(runtime.host_mut(), &panel);
        assert_eq!(runtime.handle(HostEvent::Changed).await, Outcome::Ignored);
        assert_eq!(runtime.reapply_passes(), 0);
    }

    #[tokio::test]
    async fn waits_for_readiness_when_panel_is_absent() {
        let mut doc = Document::new();
        let body = doc.append_element(doc.root(), "body", &[]);
        let mut runtime = runtime_for(doc);

        assert_eq!(runtime.start().await, &Phase::AwaitingPanel);
        assert_eq!(runtime.handle(HostEvent::Intent(Intent::PublishLive)).await, Outcome::Ignored);
        assert!(runtime.window().alerts().is_empty());

        // Readiness with no panel keeps waiting.
        assert_eq!(runtime.handle(HostEvent::Ready).await, Outcome::Ignored);

        let panel = insert_panel(runtime.host_mut(), body, Some("appr@example.com"));
        assert_eq!(runtime.handle(HostEvent::Ready).await, Outcome::Attached);
        assert_eq!(runtime.role(), Some(Role::Approver));
        assert!(!shown(&runtime, &panel, ControlClass::Live));

        // A second readiness signal does not re-run the bootstrap.
        assert_eq!(runtime.handle(HostEvent::Ready).await, Outcome::Ignored);
        let badges = search(runtime.host(), Some(panel.panel_root), r#"div[data-marker="badge"]"#);
        assert_eq!(badges.len(), 1);
    }

    #[tokio::test]
    async fn role_is_resolved_once_per_attach() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (doc, _panel) = sample_panel(Some("pub@example.com"));
        let mut runtime = Runtime::new(
            doc,
            SimulatedWindow::new(Url::parse(HREF).unwrap()),
            CountingDirectory {
                role: Role::Approver,
                calls: calls.clone(),
            },
            MemoryStore::new(),
            &config(),
        )
        .unwrap();

        runtime.start().await;
        runtime.handle(HostEvent::Ready).await;
        runtime.handle(HostEvent::Changed).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.role(), Some(Role::Approver));
    }

    #[tokio::test(start_paused = true)]
    async fn identity_is_read_only_after_the_initial_delay() {
        let (doc, panel) = sample_panel(Some("appr@example.com"));
        let config = RuntimeConfig {
            initial_delay_ms: 600,
            ..config()
        };
        let mut runtime = runtime_with(doc, &config);

        // Cut short before the delay elapses: nothing has been applied yet.
        let cut_short = tokio::time::timeout(Duration::from_millis(599), runtime.start())
            .await
            .is_err();
        assert!(cut_short);
        assert_eq!(runtime.phase(), &Phase::AwaitingPanel);
        assert!(shown(&runtime, &panel, ControlClass::Live));
        let badges = search(runtime.host(), Some(panel.panel_root), r#"div[data-marker="badge"]"#);
        assert!(badges.is_empty());

        let before = tokio::time::Instant::now();
        runtime.start().await;
        assert!(before.elapsed() >= Duration::from_millis(600));
        assert_eq!(runtime.role(), Some(Role::Approver));
        assert!(matches!(runtime.phase(), Phase::Active { .. }));
        assert!(!shown(&runtime, &panel, ControlClass::Live));
    }

    // ── Re-render ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn rerender_is_re_gated() {
        let (mut runtime, panel) = started(Some("appr@example.com")).await;
        assert!(!shown(&runtime, &panel, ControlClass::Live));

        rerender_env_switcher(runtime.host_mut(), &panel);
        assert!(shown(&runtime, &panel, ControlClass::Live));

        assert_eq!(runtime.handle(HostEvent::Changed).await, Outcome::Reapplied);
        assert!(!shown(&runtime, &panel, ControlClass::Live));
        assert!(shown(&runtime, &panel, ControlClass::Preview));
        assert_eq!(runtime.reapply_passes(), 1);

        // Nothing structural since.
        assert_eq!(runtime.handle(HostEvent::Changed).await, Outcome::Ignored);
    }

    // ── Workflow intents ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn publish_intent_is_gated_on_approval() {
        let (mut runtime, _panel) = started(Some("pub@example.com")).await;

        let blocked = runtime.handle(HostEvent::Intent(Intent::PublishLive)).await;
        assert_eq!(
            blocked,
            Outcome::Publish(PublishDecision::Blocked {
                status: ApprovalStatus::Draft
            })
        );
        assert_eq!(runtime.window().alerts(), vec![Notice::PublishDenied]);

        runtime.workflow().set_status("/docs/a.html", "approved", "").unwrap();
        let opened = runtime.handle(HostEvent::Intent(Intent::PublishLive)).await;
        assert_eq!(
            opened,
            Outcome::Publish(PublishDecision::Opened {
                url: "https://main--site--org.live/docs/a.html".to_string()
            })
        );
    }

    #[tokio::test]
    async fn intents_work_in_degraded_mode() {
        let (mut runtime, _panel) = started(None).await;
        assert_eq!(
            runtime.handle(HostEvent::Intent(Intent::Edit)).await,
            Outcome::EditNoticeShown
        );
        assert_eq!(runtime.window().alerts(), vec![Notice::EditInstructions]);
        assert_eq!(
            runtime.handle(HostEvent::Intent(Intent::Preview)).await,
            Outcome::PreviewOpened { url: HREF.to_string() }
        );
    }

    #[test]
    fn intents_map_to_host_event_names() {
        assert_eq!(Intent::from_event_name("custom:eds-edit"), Some(Intent::Edit));
        assert_eq!(Intent::from_event_name("custom:eds-preview"), Some(Intent::Preview));
        assert_eq!(Intent::from_event_name("custom:eds-publish-live"), Some(Intent::PublishLive));
        assert_eq!(Intent::from_event_name("custom:eds-delete"), None);
    }

    // ── Cross-context messages ────────────────────────────────────────────────

    #[tokio::test]
    async fn state_requests_are_answered_for_allowed_origins_only() {
        let (mut runtime, _panel) = started(Some("pub@example.com")).await;

        let request = json!({"type": "getState"});
        let denied = runtime
            .handle(HostEvent::Message {
                origin: "https://evil.example.com".to_string(),
                data: request.clone(),
            })
            .await;
        assert_eq!(denied, Outcome::Ignored);
        assert!(runtime.window().posted().is_empty());

        let answered = runtime
            .handle(HostEvent::Message {
                origin: PALETTE.to_string(),
                data: request,
            })
            .await;
        assert_eq!(answered, Outcome::Replied);
        let posted = runtime.window().posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].target_origin, PALETTE);
        assert_eq!(posted[0].body.sidekick.location, "/docs/a.html");
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    #[test]
    fn config_from_toml_with_all_sections() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            initial_delay_ms = 250

            [directory]
            url = "https://example.com/roles.tsv"
            delimiter = "\t"

            [rules]
            mode = "from-baseline"

            [workflow]
            allowed_origins = ["https://palette.example.com"]
            "#,
        )
        .unwrap();

        assert_eq!(config.panel_marker, "aem-sidekick");
        assert_eq!(config.initial_delay().as_millis(), 250);
        assert_eq!(config.directory.delimiter, '\t');
        assert_eq!(config.rules.mode, panelgate_policy::ReapplyMode::FromBaseline);
        assert_eq!(config.workflow.storage_key, "eds-approval-state");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.initial_delay_ms, 600);
        assert!(config.workflow.allowed_origins.is_empty());
    }

    #[test]
    fn config_file_round_trip_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panelgate.toml");
        std::fs::write(&path, "panel_marker = \"my-panel\"\n").unwrap();
        assert_eq!(RuntimeConfig::from_file(&path).unwrap().panel_marker, "my-panel");

        assert!(matches!(
            RuntimeConfig::from_file(&dir.path().join("missing.toml")),
            Err(GateError::Config { .. })
        ));
        assert!(matches!(
            RuntimeConfig::from_toml_str("initial_delay_ms = \"soon\""),
            Err(GateError::Config { .. })
        ));
    }

    #[test]
    fn invalid_panel_marker_is_rejected() {
        let config = RuntimeConfig {
            panel_marker: "aem-sidekick:hover".to_string(),
            ..config()
        };
        let result = Runtime::new(
            Document::new(),
            SimulatedWindow::new(Url::parse(HREF).unwrap()),
            DirectoryClient::new(StaticTableSource(TABLE.to_string()), ','),
            MemoryStore::new(),
            &config,
        );
        match result {
            Err(GateError::Config { reason }) => assert!(reason.contains("panel_marker")),
            Err(other) => panic!("expected ConfigError, got {other}"),
            Ok(_) => panic!("expected ConfigError"),
        }
    }
}
