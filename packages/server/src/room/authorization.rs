use surrealdb::engine::any::Any;
use teamroom_entity::types::ProjectPermissions;
use teamroom_surrealdb::repository::{ProjectMemberRepository, ProjectRepository, RepositoryError};
use tracing::debug;

/// The single authority on what a user may do inside a project.
///
/// Every call reads the ledger again. Nothing is cached, so a status change is
/// visible to the very next check.
#[derive(Clone)]
pub struct AuthorizationResolver {
    projects: ProjectRepository<Any>,
    members: ProjectMemberRepository<Any>,
}

impl AuthorizationResolver {
    pub fn new(projects: ProjectRepository<Any>, members: ProjectMemberRepository<Any>) -> Self {
        Self { projects, members }
    }

    /// `resolve`, but an unknown project is `NotFound` instead of an empty permission set
    pub async fn resolve_existing(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> Result<ProjectPermissions, RepositoryError> {
        self.projects.require(project_id).await?;
        self.resolve(project_id, user_id).await
    }

    pub async fn resolve(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> Result<ProjectPermissions, RepositoryError> {
        let record = self.members.find(project_id, user_id).await?;
        let permissions = ProjectPermissions::derive(record.as_ref());
        debug!(
            project_id,
            user_id,
            exists = permissions.exists,
            can_message = permissions.can_message,
            "Resolved project permissions"
        );
        Ok(permissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teamroom_entity::types::{MembershipStatus, Project, ProjectMember, ProjectRole};
    use teamroom_surrealdb::repository::{LedgerTransition, ProjectRepository};
    use teamroom_surrealdb::test_utils::TestDatabase;

    #[tokio::test]
    async fn resolve_reflects_latest_ledger_state() {
        let test_db = TestDatabase::new().await.unwrap();
        let projects = ProjectRepository::new(test_db.db.clone());
        projects
            .create_with_leader(Project::new("p1", "Robotics", "lead", 4), 6)
            .await
            .unwrap();
        let members = ProjectMemberRepository::new(test_db.db.clone());
        let resolver = AuthorizationResolver::new(projects, members.clone());

        let stranger = resolver.resolve("p1", "w").await.unwrap();
        assert!(!stranger.exists);
        assert!(!stranger.can_message);

        members.create(ProjectMember::invitation("p1", "w"), Some(4)).await.unwrap();
        let invited = resolver.resolve("p1", "w").await.unwrap();
        assert_eq!(invited.status, Some(MembershipStatus::Invited));
        assert!(!invited.can_message);

        members
            .transition("p1", "w", LedgerTransition::Accept {
                from: MembershipStatus::Invited,
                max_members: 4,
            })
            .await
            .unwrap();
        let accepted = resolver.resolve("p1", "w").await.unwrap();
        assert!(accepted.can_message);
        assert!(!accepted.can_assign_tasks);

        let leader = resolver.resolve("p1", "lead").await.unwrap();
        assert_eq!(leader.role, Some(ProjectRole::Leader));
        assert!(leader.can_manage_members);
        assert!(leader.can_assign_tasks);
    }

    #[tokio::test]
    async fn resolve_existing_reports_unknown_projects() {
        let test_db = TestDatabase::new().await.unwrap();
        let resolver = AuthorizationResolver::new(
            ProjectRepository::new(test_db.db.clone()),
            ProjectMemberRepository::new(test_db.db.clone()),
        );

        let missing = resolver.resolve_existing("no-such-project", "lead").await;
        assert!(matches!(missing, Err(RepositoryError::NotFound { .. })));
        assert!(!resolver.resolve("no-such-project", "lead").await.unwrap().exists);
    }
}
