//! # panelgate-dom
//!
//! An in-memory host for the panelgate overlay.
//!
//! [`Document`] implements `PanelHost`: elements, text, encapsulated roots,
//! inline styles and structural mutation observation. [`SimulatedWindow`]
//! implements `PageWindow` by recording its side effects. The `sample`
//! module builds a toolbar panel with the same nesting as the real host,
//! used by tests across the workspace and by the demo CLI.

pub mod document;
pub mod sample;
pub mod window;

pub use document::{Document, NodeId, Style};
pub use window::SimulatedWindow;

// ── Tests ─────────────────────────────────────────────────────────────────────
