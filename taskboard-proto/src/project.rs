//! Project and membership types shared between client and server.

use serde::{Deserialize, Serialize};

/// A member's role within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The user who created the project.
    Creator,
    /// Can manage members and delete any task.
    Admin,
    /// Regular member.
    Member,
}

impl Role {
    /// Whether this role may delete tasks created by other members.
    #[must_use]
    pub const fn can_delete_any_task(self) -> bool {
        matches!(self, Self::Creator | Self::Admin)
    }

    /// Whether this role may add or remove project members.
    #[must_use]
    pub const fn can_manage_members(self) -> bool {
        matches!(self, Self::Creator | Self::Admin)
    }
}

/// A project member as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    /// The member's user id.
    pub user_id: String,
    /// The member's role.
    pub role: Role,
}

/// Summary information about a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Unique project identifier.
    pub project_id: String,
    /// Human-readable project name.
    pub name: String,
    /// Current number of members.
    pub member_count: u32,
}
