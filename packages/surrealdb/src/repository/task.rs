use surrealdb::{Connection, Surreal};
use teamroom_entity::types::ProjectTask;

use crate::repository::error::RepositoryError;

const TABLE: &str = "project_task";

pub struct TaskRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for TaskRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<C: Connection> TaskRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    pub async fn create(&self, task: ProjectTask) -> Result<ProjectTask, RepositoryError> {
        let created: Option<ProjectTask> =
            self.db.create((TABLE, task.task_id.clone())).content(task).await?;

        created.ok_or_else(|| RepositoryError::write_failed("create task"))
    }

    pub async fn get(&self, task_id: &str) -> Result<Option<ProjectTask>, RepositoryError> {
        let task: Option<ProjectTask> = self.db.select((TABLE, task_id.to_string())).await?;
        Ok(task)
    }

    pub async fn update(&self, task: ProjectTask) -> Result<ProjectTask, RepositoryError> {
        let updated: Option<ProjectTask> =
            self.db.update((TABLE, task.task_id.clone())).content(task).await?;

        updated.ok_or_else(|| RepositoryError::write_failed("update task"))
    }

    pub async fn delete(&self, task_id: &str) -> Result<Option<ProjectTask>, RepositoryError> {
        let deleted: Option<ProjectTask> = self.db.delete((TABLE, task_id.to_string())).await?;
        Ok(deleted)
    }

    pub async fn list_for_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<ProjectTask>, RepositoryError> {
        let tasks: Vec<ProjectTask> = self
            .db
            .query("SELECT * FROM project_task WHERE project_id = $project_id ORDER BY created_at ASC")
            .bind(("project_id", project_id.to_string()))
            .await?
            .take(0)?;
        Ok(tasks)
    }
}
