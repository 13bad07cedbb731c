use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::engine::any::Any;
use teamroom_entity::types::{ProjectTask, TaskStatus};
use teamroom_surrealdb::repository::{ProjectRepository, TaskRepository};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::room::AuthorizationResolver;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub assigned_to: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// Partial edit. An assignee without `can_assign_tasks` may only send `status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

impl UpdateTask {
    fn status_only(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.deadline.is_none()
    }
}

/// Task assignment inside a project, gated by the same permission set as chat
#[derive(Clone)]
pub struct TaskService {
    projects: ProjectRepository<Any>,
    tasks: TaskRepository<Any>,
    resolver: AuthorizationResolver,
}

impl TaskService {
    pub fn new(
        projects: ProjectRepository<Any>,
        tasks: TaskRepository<Any>,
        resolver: AuthorizationResolver,
    ) -> Self {
        Self { projects, tasks, resolver }
    }

    pub async fn create_task(
        &self,
        actor: &str,
        project_id: &str,
        request: CreateTask,
    ) -> Result<ProjectTask, ApiError> {
        self.projects.require(project_id).await?;

        let permissions = self.resolver.resolve(project_id, actor).await?;
        if !permissions.can_assign_tasks {
            return Err(ApiError::forbidden("only the leader or a mentor can assign tasks"));
        }

        let title = request.title.trim();
        if title.is_empty() {
            return Err(ApiError::bad_request("title must not be empty"));
        }

        let assignee = self.resolver.resolve(project_id, &request.assigned_to).await?;
        if !assignee.can_message {
            return Err(ApiError::bad_request(format!(
                "{} is not an accepted member of {}",
                request.assigned_to, project_id
            )));
        }

        let task = ProjectTask {
            task_id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            assigned_to: request.assigned_to,
            assigned_by: actor.to_string(),
            title: title.to_string(),
            description: request.description,
            status: TaskStatus::Pending,
            deadline: request.deadline,
            created_at: Utc::now(),
        };
        let task = self.tasks.create(task).await?;
        info!(project_id, task_id = %task.task_id, assigned_to = %task.assigned_to, "Task assigned");
        Ok(task)
    }

    pub async fn list_tasks(
        &self,
        actor: &str,
        project_id: &str,
    ) -> Result<Vec<ProjectTask>, ApiError> {
        self.projects.require(project_id).await?;
        let permissions = self.resolver.resolve(project_id, actor).await?;
        if !permissions.can_message {
            return Err(ApiError::forbidden("only accepted members can see tasks"));
        }
        Ok(self.tasks.list_for_project(project_id).await?)
    }

    pub async fn update_task(
        &self,
        actor: &str,
        project_id: &str,
        task_id: &str,
        request: UpdateTask,
    ) -> Result<ProjectTask, ApiError> {
        self.projects.require(project_id).await?;
        let permissions = self.resolver.resolve(project_id, actor).await?;
        if !permissions.can_message {
            return Err(ApiError::forbidden("only accepted members can update tasks"));
        }
        let mut task = self.require_task(project_id, task_id).await?;

        let own_status_change = task.assigned_to == actor && request.status_only();
        if !permissions.can_assign_tasks && !own_status_change {
            warn!(project_id, task_id, actor, "Task update refused");
            return Err(ApiError::forbidden(
                "only the leader or a mentor can edit tasks; assignees may change the status",
            ));
        }

        if let Some(title) = request.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(ApiError::bad_request("title must not be empty"));
            }
            task.title = title.to_string();
        }
        if let Some(description) = request.description {
            task.description = Some(description);
        }
        if let Some(deadline) = request.deadline {
            task.deadline = Some(deadline);
        }
        if let Some(status) = request.status {
            task.status = status;
        }

        let task = self.tasks.update(task).await?;
        info!(project_id, task_id, status = ?task.status, updated_by = actor, "Task updated");
        Ok(task)
    }

    pub async fn delete_task(
        &self,
        actor: &str,
        project_id: &str,
        task_id: &str,
    ) -> Result<(), ApiError> {
        self.projects.require(project_id).await?;
        let permissions = self.resolver.resolve(project_id, actor).await?;
        if !permissions.can_assign_tasks {
            return Err(ApiError::forbidden("only the leader or a mentor can delete tasks"));
        }
        self.require_task(project_id, task_id).await?;

        if self.tasks.delete(task_id).await?.is_none() {
            return Err(ApiError::not_found(format!("no task {} in {}", task_id, project_id)));
        }
        info!(project_id, task_id, deleted_by = actor, "Task deleted");
        Ok(())
    }

    async fn require_task(&self, project_id: &str, task_id: &str) -> Result<ProjectTask, ApiError> {
        self.tasks
            .get(task_id)
            .await?
            .filter(|task| task.project_id == project_id)
            .ok_or_else(|| ApiError::not_found(format!("no task {} in {}", task_id, project_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestApp;

    async fn assigned(app: &TestApp, project_id: &str, assignee: &str) -> ProjectTask {
        let request = CreateTask {
            assigned_to: assignee.to_string(),
            title: "Draft the report".to_string(),
            description: None,
            deadline: None,
        };
        app.state.tasks.create_task("lead", project_id, request).await.unwrap()
    }

    fn status(status: TaskStatus) -> UpdateTask {
        UpdateTask { status: Some(status), ..Default::default() }
    }

    #[tokio::test]
    async fn assignee_moves_own_task_through_statuses() {
        let app = TestApp::new().await;
        let project_id = app.project("lead", 4).await;
        app.member(&project_id, "lead", "w").await;
        let task = assigned(&app, &project_id, "w").await;

        let started = app
            .state
            .tasks
            .update_task("w", &project_id, &task.task_id, status(TaskStatus::InProgress))
            .await
            .unwrap();
        assert_eq!(started.status, TaskStatus::InProgress);

        let done = app
            .state
            .tasks
            .update_task("w", &project_id, &task.task_id, status(TaskStatus::Completed))
            .await
            .unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.title, "Draft the report");
    }

    #[tokio::test]
    async fn assignee_cannot_edit_other_fields_or_delete() {
        let app = TestApp::new().await;
        let project_id = app.project("lead", 4).await;
        app.member(&project_id, "lead", "w").await;
        app.member(&project_id, "lead", "other").await;
        let task = assigned(&app, &project_id, "w").await;

        let retitle = UpdateTask { title: Some("Mine now".to_string()), ..Default::default() };
        let err = app.state.tasks.update_task("w", &project_id, &task.task_id, retitle).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = app
            .state
            .tasks
            .update_task("other", &project_id, &task.task_id, status(TaskStatus::Completed))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = app.state.tasks.delete_task("w", &project_id, &task.task_id).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn leader_edits_and_deletes_tasks() {
        let app = TestApp::new().await;
        let project_id = app.project("lead", 4).await;
        app.member(&project_id, "lead", "w").await;
        let task = assigned(&app, &project_id, "w").await;

        let edit = UpdateTask {
            title: Some("  Final report  ".to_string()),
            description: Some("ten pages".to_string()),
            ..Default::default()
        };
        let edited = app.state.tasks.update_task("lead", &project_id, &task.task_id, edit).await.unwrap();
        assert_eq!(edited.title, "Final report");
        assert_eq!(edited.description.as_deref(), Some("ten pages"));

        let blank = UpdateTask { title: Some("   ".to_string()), ..Default::default() };
        let err = app.state.tasks.update_task("lead", &project_id, &task.task_id, blank).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        app.state.tasks.delete_task("lead", &project_id, &task.task_id).await.unwrap();
        assert!(app.state.tasks.list_tasks("lead", &project_id).await.unwrap().is_empty());
        let err = app.state.tasks.delete_task("lead", &project_id, &task.task_id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn task_ids_are_scoped_to_their_project() {
        let app = TestApp::new().await;
        let first = app.project("lead", 4).await;
        let second = app.project("lead", 4).await;
        app.member(&first, "lead", "w").await;
        let task = assigned(&app, &first, "w").await;

        let err = app
            .state
            .tasks
            .update_task("lead", &second, &task.task_id, status(TaskStatus::Completed))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let err = app.state.tasks.delete_task("lead", &second, &task.task_id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
