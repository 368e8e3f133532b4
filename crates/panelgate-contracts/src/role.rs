//! User roles and the directory rows they are resolved from.
//!
//! There are exactly three roles. They are ordered by convention
//! (author ⊂ approver ⊂ publisher) but nothing in the code relies on a
//! hierarchy: every decision is made from the explicit visibility mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The role of the signed-in user for the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May edit source documents. Cannot preview or publish from the panel.
    #[default]
    Author,
    /// May edit and preview. Cannot publish.
    Approver,
    /// May edit, preview, and publish.
    Publisher,
}

impl Role {
    /// Every role, most restrictive first.
    pub const ALL: [Role; 3] = [Role::Author, Role::Approver, Role::Publisher];

    /// Parse a role from directory text.
    ///
    /// Surrounding whitespace and case are ignored. Unknown or empty values
    /// resolve to `Author`, the least privileged role.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "approver" => Role::Approver,
            "publisher" => Role::Publisher,
            _ => Role::Author,
        }
    }

    /// Lower-case identifier, as written in the directory.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Author => "author",
            Role::Approver => "approver",
            Role::Publisher => "publisher",
        }
    }

    /// Text shown on the role badge.
    pub fn badge_label(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    /// Background colour of the role badge.
    pub fn badge_color(&self) -> &'static str {
        match self {
            Role::Author => "#3f8cff",
            Role::Approver => "#ffc107",
            Role::Publisher => "#28a745",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single parsed row of the role directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRow {
    /// Email as written in the directory (trimmed, original case).
    pub email: String,
    /// Role parsed from the `role` column.
    pub role: Role,
}

impl DirectoryRow {
    /// Case-insensitive email comparison. Both sides are trimmed.
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.trim().to_lowercase() == email.trim().to_lowercase()
    }
}
