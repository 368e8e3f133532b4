//! # panelgate-policy
//!
//! Role-based visibility rules for the host panel.
//!
//! ## Overview
//!
//! [`RuleEngine`] maps a resolved role to a visibility decision over three
//! control classes (edit, preview, live) and applies it with deep
//! traversal. It also injects the role badge and, when nobody is signed in,
//! disables the panel. [`RerenderWatcher`] re-applies the rules whenever
//! the host re-renders.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use panelgate_policy::{RuleEngine, RerenderWatcher, RulesConfig};
//!
//! let engine = RuleEngine::new(&RulesConfig::default())?;
//! engine.apply_role(&mut doc, panel_root, role);
//! engine.inject_badge(&mut doc, panel_root, role);
//! let mut watcher = RerenderWatcher::install(&mut doc, panel_root, role);
//! // later, when the host signals change:
//! watcher.on_change(&engine, &mut doc);
//! ```

pub mod config;
pub mod engine;
pub mod watcher;

pub use config::{ControlSelectors, ReapplyMode, RulesConfig};
pub use engine::{ApplyReport, RuleEngine};
pub use watcher::RerenderWatcher;

// ── Tests ─────────────────────────────────────────────────────────────────────
