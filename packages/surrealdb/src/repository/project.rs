use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use teamroom_entity::types::{Project, ProjectMember};
use tracing::info;

use crate::repository::error::RepositoryError;
use crate::repository::locks::ProjectLocks;

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u32,
}

pub struct ProjectRepository<C: Connection> {
    db: Surreal<C>,
    leader_locks: ProjectLocks,
}

impl<C: Connection> Clone for ProjectRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone(), leader_locks: self.leader_locks.clone() }
    }
}

impl<C: Connection> ProjectRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, leader_locks: ProjectLocks::new() }
    }

    /// Write the project and its leader's accepted record in one transaction.
    ///
    /// Fails with `Capacity` once the leader already leads `max_led` projects.
    pub async fn create_with_leader(
        &self,
        project: Project,
        max_led: u32,
    ) -> Result<(Project, ProjectMember), RepositoryError> {
        if project.max_members == 0 {
            return Err(RepositoryError::validation("max_members", "must be at least 1"));
        }
        if project.title.trim().is_empty() {
            return Err(RepositoryError::validation("title", "must not be empty"));
        }

        let _guard = self.leader_locks.lock(&project.leader_id).await;

        let led = self.count_led_by(&project.leader_id).await?;
        if led >= max_led {
            return Err(RepositoryError::capacity(format!(
                "{} already leads {} projects",
                project.leader_id, led
            )));
        }

        let leader = ProjectMember::leader(&project.project_id, &project.leader_id);
        self.db
            .query(
                "BEGIN TRANSACTION;
                 CREATE type::thing('project', $project_id) CONTENT $project;
                 CREATE type::thing('project_member', $member_key) CONTENT $leader;
                 COMMIT TRANSACTION;",
            )
            .bind(("project_id", project.project_id.clone()))
            .bind(("project", project.clone()))
            .bind(("member_key", leader.key()))
            .bind(("leader", leader.clone()))
            .await?
            .check()?;

        info!(
            project_id = %project.project_id,
            leader_id = %project.leader_id,
            max_members = project.max_members,
            "Project created"
        );
        Ok((project, leader))
    }

    pub async fn get(&self, project_id: &str) -> Result<Option<Project>, RepositoryError> {
        let project: Option<Project> = self.db.select(("project", project_id.to_string())).await?;
        Ok(project)
    }

    /// Like `get`, but a missing project is an error
    pub async fn require(&self, project_id: &str) -> Result<Project, RepositoryError> {
        self.get(project_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("project", project_id))
    }

    pub async fn count_led_by(&self, leader_id: &str) -> Result<u32, RepositoryError> {
        let mut response = self
            .db
            .query("SELECT count() AS total FROM project WHERE leader_id = $leader_id GROUP ALL")
            .bind(("leader_id", leader_id.to_string()))
            .await?;
        let row: Option<CountRow> = response.take(0)?;
        Ok(row.map(|r| r.total).unwrap_or(0))
    }
}
