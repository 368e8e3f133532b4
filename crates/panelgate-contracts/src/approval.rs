//! Approval workflow records.
//!
//! One `ApprovalRecord` per document path. The gate only distinguishes
//! `Approved` from everything else; any status string a caller sets is
//! preserved verbatim.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow status of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApprovalStatus {
    /// Initial status; also the implicit status of any path never set.
    Draft,
    /// The only status that opens the publish gate.
    Approved,
    Rejected,
    /// Any other caller-chosen status. Behaves like "not approved".
    Other(String),
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ApprovalStatus::Draft => "draft",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Other(s) => s,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, ApprovalStatus::Approved)
    }
}

impl From<String> for ApprovalStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "draft" => ApprovalStatus::Draft,
            "approved" => ApprovalStatus::Approved,
            "rejected" => ApprovalStatus::Rejected,
            _ => ApprovalStatus::Other(s),
        }
    }
}

impl From<&str> for ApprovalStatus {
    fn from(s: &str) -> Self {
        ApprovalStatus::from(s.to_string())
    }
}

impl From<ApprovalStatus> for String {
    fn from(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted workflow state of one document path.
///
/// A path that was never set reads back as [`ApprovalRecord::implicit_draft`],
/// which carries no comments and no timestamp. Explicit writes always carry
/// both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub status: ApprovalStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    /// Wall-clock time (UTC) of the write that produced this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl ApprovalRecord {
    /// The record reported for a path with no stored state.
    pub fn implicit_draft() -> Self {
        Self {
            status: ApprovalStatus::Draft,
            comments: None,
            updated: None,
        }
    }

    /// A freshly written record stamped with the current time.
    pub fn written(status: ApprovalStatus, comments: impl Into<String>) -> Self {
        Self {
            status,
            comments: Some(comments.into()),
            updated: Some(Utc::now()),
        }
    }
}
