//! Messages exchanged with the surrounding page: cross-context state
//! queries, user-visible notices, and markers appended to the panel.

use serde::{Deserialize, Serialize};

use crate::approval::ApprovalRecord;

/// The message type a companion context sends to ask for workflow state.
pub const GET_STATE: &str = "getState";

/// A request received from another window context.
///
/// Only `{"type": "getState"}` is recognized; any other payload parses to
/// `None` in [`StateRequest::from_value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRequest {
    #[serde(rename = "type")]
    pub kind: String,
}

impl StateRequest {
    pub fn get_state() -> Self {
        Self { kind: GET_STATE.to_string() }
    }

    /// Interpret an arbitrary message payload as a state request.
    pub fn from_value(data: &serde_json::Value) -> Option<Self> {
        let request: StateRequest = serde_json::from_value(data.clone()).ok()?;
        (request.kind == GET_STATE).then_some(request)
    }
}

/// The reply body: `{"sidekick": {"location": ..., "status": {...}}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateReply {
    pub sidekick: PanelState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelState {
    /// Path of the current document.
    pub location: String,
    /// Its approval record (implicit draft when unset).
    pub status: ApprovalRecord,
}

/// A reply addressed to the origin that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub target_origin: String,
    pub body: StateReply,
}

/// Blocking, single-button notices shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Shown on edit intent: documents are edited outside the panel.
    EditInstructions,
    /// Shown when publish is requested for a document that is not approved.
    PublishDenied,
}

impl Notice {
    pub fn text(&self) -> &'static str {
        match self {
            Notice::EditInstructions => "EDIT MODE:\n\nOpen your Google Doc / Word document manually.",
            Notice::PublishDenied => "Cannot publish — page must be APPROVED first.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// The role badge shown next to the brand mark.
    Badge,
    /// The "sign in" hint shown in degraded mode.
    Notice,
}

/// An element the engine appends next to the panel's brand mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub label: String,
    /// CSS colour. For badges this is the background, for notices the text.
    pub color: String,
}

impl Marker {
    pub const FALLBACK_COLOR: &'static str = "#666";

    pub fn badge(label: impl Into<String>, color: Option<&str>) -> Self {
        Self {
            kind: MarkerKind::Badge,
            label: label.into(),
            color: color.unwrap_or(Self::FALLBACK_COLOR).to_string(),
        }
    }

    pub fn sign_in_notice() -> Self {
        Self {
            kind: MarkerKind::Notice,
            label: "Sign in to use Sidekick".to_string(),
            color: "#ffb200".to_string(),
        }
    }
}
