//! The visibility rule set: which control classes each role may see.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// The three named classes of panel controls the engine governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlClass {
    /// Open the source document for editing.
    Edit,
    /// Switch to the preview rendering.
    Preview,
    /// Switch to (or publish to) the live rendering.
    Live,
}

impl ControlClass {
    pub const ALL: [ControlClass; 3] = [ControlClass::Edit, ControlClass::Preview, ControlClass::Live];
}

/// The visibility decision for one role.
///
/// Derived, never stored. The mapping from `Role` is total and an
/// unresolved role gets the author mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub show_edit: bool,
    pub show_preview: bool,
    pub show_live: bool,
}

impl Visibility {
    /// The most restrictive mapping: edit only.
    pub const MOST_RESTRICTIVE: Visibility = Visibility {
        show_edit: true,
        show_preview: false,
        show_live: false,
    };

    /// The mapping for `role`.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Author => Self::MOST_RESTRICTIVE,
            Role::Approver => Visibility {
                show_edit: true,
                show_preview: true,
                show_live: false,
            },
            Role::Publisher => Visibility {
                show_edit: true,
                show_preview: true,
                show_live: true,
            },
        }
    }

    /// The mapping for a role that may not have been resolved.
    pub fn for_resolved(role: Option<Role>) -> Self {
        role.map(Self::for_role).unwrap_or(Self::MOST_RESTRICTIVE)
    }

    /// Whether controls of `class` stay visible under this mapping.
    pub fn shows(&self, class: ControlClass) -> bool {
        match class {
            ControlClass::Edit => self.show_edit,
            ControlClass::Preview => self.show_preview,
            ControlClass::Live => self.show_live,
        }
    }

    /// Number of visible control classes. Used to compare restrictiveness.
    pub fn visible_count(&self) -> usize {
        ControlClass::ALL.iter().filter(|c| self.shows(**c)).count()
    }
}

impl Role {
    /// Shorthand for `Visibility::for_role(self)`.
    pub fn visibility(self) -> Visibility {
        Visibility::for_role(self)
    }
}
