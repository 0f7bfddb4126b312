//! Project registry for the board server.
//!
//! Maintains an in-memory directory of projects and their members. Every
//! task route authorizes the caller against this registry before touching
//! the task store. Membership enforcement lives here; the task store itself
//! trusts its callers.
//!
//! Entries are ephemeral — lost on server restart, same as the task store.

use std::collections::HashMap;

use taskboard_proto::project::{MemberInfo, ProjectInfo, Role};
use tokio::sync::RwLock;

/// Maximum number of projects the registry will hold.
const MAX_REGISTRY_PROJECTS: usize = 1000;

/// An entry in the project registry tracking project metadata and members.
#[derive(Debug, Clone)]
pub struct ProjectEntry {
    /// Unique project identifier.
    pub project_id: String,
    /// Human-readable project name.
    pub name: String,
    /// Members keyed by user id.
    pub members: HashMap<String, Role>,
}

/// Errors that can occur during project registry operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProjectError {
    /// A project with the same name (case-insensitive) already exists.
    #[error("a project with that name already exists")]
    NameConflict,
    /// The registry has reached its maximum capacity.
    #[error("project registry is full (max {MAX_REGISTRY_PROJECTS} projects)")]
    CapacityReached,
    /// The specified project was not found.
    #[error("project not found")]
    ProjectNotFound,
    /// The user is already a member of the project.
    #[error("user is already a member")]
    AlreadyMember,
    /// The user is not a member of the project.
    #[error("user is not a member")]
    NotMember,
    /// The project creator cannot be removed.
    #[error("the project creator cannot be removed")]
    CannotRemoveCreator,
}

/// In-memory directory of projects and memberships.
///
/// Thread-safe via [`RwLock`].
pub struct ProjectRegistry {
    projects: RwLock<HashMap<String, ProjectEntry>>,
}

impl Default for ProjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectRegistry {
    /// Creates a new, empty project registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a project; the creator becomes its first member with
    /// [`Role::Creator`].
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::NameConflict`] if a project with the same
    /// name (case-insensitive) exists, or [`ProjectError::CapacityReached`].
    pub async fn register(
        &self,
        project_id: &str,
        name: &str,
        creator_user_id: &str,
    ) -> Result<(), ProjectError> {
        let mut projects = self.projects.write().await;

        if projects.len() >= MAX_REGISTRY_PROJECTS && !projects.contains_key(project_id) {
            return Err(ProjectError::CapacityReached);
        }

        let name_lower = name.to_lowercase();
        for (id, entry) in projects.iter() {
            if id != project_id && entry.name.to_lowercase() == name_lower {
                return Err(ProjectError::NameConflict);
            }
        }

        let mut members = HashMap::new();
        members.insert(creator_user_id.to_string(), Role::Creator);
        projects.insert(
            project_id.to_string(),
            ProjectEntry {
                project_id: project_id.to_string(),
                name: name.to_string(),
                members,
            },
        );
        drop(projects);

        Ok(())
    }

    /// Removes a project from the directory.
    ///
    /// Returns `true` if the project existed and was removed.
    pub async fn unregister(&self, project_id: &str) -> bool {
        let mut projects = self.projects.write().await;
        projects.remove(project_id).is_some()
    }

    /// Whether the user is a member of the project.
    pub async fn is_member(&self, project_id: &str, user_id: &str) -> bool {
        let projects = self.projects.read().await;
        projects
            .get(project_id)
            .is_some_and(|e| e.members.contains_key(user_id))
    }

    /// The user's role within the project, if they are a member.
    pub async fn member_role(&self, project_id: &str, user_id: &str) -> Option<Role> {
        let projects = self.projects.read().await;
        projects.get(project_id)?.members.get(user_id).copied()
    }

    /// Lists the projects the user belongs to.
    pub async fn list_for(&self, user_id: &str) -> Vec<ProjectInfo> {
        let projects = self.projects.read().await;
        let mut out: Vec<ProjectInfo> = projects
            .values()
            .filter(|e| e.members.contains_key(user_id))
            .map(|e| ProjectInfo {
                project_id: e.project_id.clone(),
                name: e.name.clone(),
                member_count: u32::try_from(e.members.len()).unwrap_or(u32::MAX),
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Lists a project's members.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::ProjectNotFound`].
    pub async fn members(&self, project_id: &str) -> Result<Vec<MemberInfo>, ProjectError> {
        let projects = self.projects.read().await;
        let entry = projects
            .get(project_id)
            .ok_or(ProjectError::ProjectNotFound)?;
        let mut out: Vec<MemberInfo> = entry
            .members
            .iter()
            .map(|(user_id, role)| MemberInfo {
                user_id: user_id.clone(),
                role: *role,
            })
            .collect();
        out.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(out)
    }

    /// Adds a member to a project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::ProjectNotFound`] or
    /// [`ProjectError::AlreadyMember`].
    pub async fn add_member(
        &self,
        project_id: &str,
        user_id: &str,
        role: Role,
    ) -> Result<(), ProjectError> {
        let mut projects = self.projects.write().await;
        let entry = projects
            .get_mut(project_id)
            .ok_or(ProjectError::ProjectNotFound)?;
        if entry.members.contains_key(user_id) {
            return Err(ProjectError::AlreadyMember);
        }
        entry.members.insert(user_id.to_string(), role);
        Ok(())
    }

    /// Removes a member from a project. The creator cannot be removed.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::ProjectNotFound`], [`ProjectError::NotMember`],
    /// or [`ProjectError::CannotRemoveCreator`].
    pub async fn remove_member(&self, project_id: &str, user_id: &str) -> Result<(), ProjectError> {
        let mut projects = self.projects.write().await;
        let entry = projects
            .get_mut(project_id)
            .ok_or(ProjectError::ProjectNotFound)?;
        match entry.members.get(user_id) {
            None => Err(ProjectError::NotMember),
            Some(Role::Creator) => Err(ProjectError::CannotRemoveCreator),
            Some(_) => {
                entry.members.remove(user_id);
                Ok(())
            }
        }
    }
}
