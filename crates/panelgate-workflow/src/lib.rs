//! # panelgate-workflow
//!
//! The per-document approval workflow that gates publishing.
//!
//! ```rust,ignore
//! use panelgate_workflow::{ApprovalWorkflow, MemoryStore, WorkflowConfig};
//!
//! let workflow = ApprovalWorkflow::new(MemoryStore::new(), WorkflowConfig::default());
//! workflow.set_status("/docs/a.html", "approved", "looks good")?;
//! let decision = workflow.request_publish(&window);
//! ```
//!
//! Only `approved` opens the gate. Statuses are otherwise free-form and
//! stored verbatim.

pub mod config;
pub mod store;
pub mod workflow;

pub use config::WorkflowConfig;
pub use store::{FileStore, MemoryStore};
pub use workflow::{ApprovalMap, ApprovalWorkflow, PublishDecision};

// ── Tests ─────────────────────────────────────────────────────────────────────
