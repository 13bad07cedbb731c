use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use teamroom_entity::types::ProjectMessage;
use uuid::Uuid;

use crate::repository::error::RepositoryError;
use crate::repository::locks::ProjectLocks;

#[derive(Debug, Deserialize)]
struct LastMessage {
    seq: i64,
    sent_at: DateTime<Utc>,
}

/// Append-only message history, ordered per project by `seq`
pub struct MessageRepository<C: Connection> {
    db: Surreal<C>,
    locks: ProjectLocks,
}

impl<C: Connection> Clone for MessageRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone(), locks: self.locks.clone() }
    }
}

impl<C: Connection> MessageRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, locks: ProjectLocks::new() }
    }

    /// Persist one message. `seq` is the previous tail plus one and `sent_at`
    /// never goes backwards within a project, even if the wall clock does.
    pub async fn append(
        &self,
        project_id: &str,
        sender_id: &str,
        message_text: &str,
    ) -> Result<ProjectMessage, RepositoryError> {
        let _guard = self.locks.lock(project_id).await;

        let mut response = self
            .db
            .query(
                "SELECT seq, sent_at FROM project_message WHERE project_id = $project_id ORDER BY seq DESC LIMIT 1",
            )
            .bind(("project_id", project_id.to_string()))
            .await?;
        let last: Option<LastMessage> = response.take(0)?;

        let now = Utc::now();
        let (seq, sent_at) = match last {
            Some(last) => (last.seq + 1, now.max(last.sent_at)),
            None => (1, now),
        };

        let message = ProjectMessage {
            message_id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            sender_id: sender_id.to_string(),
            message_text: message_text.to_string(),
            seq,
            sent_at,
        };

        let created: Option<ProjectMessage> = self
            .db
            .create(("project_message", message.message_id.clone()))
            .content(message)
            .await?;

        created.ok_or_else(|| {
            RepositoryError::write_failed("persist message")
        })
    }

    /// Full history of a project, oldest first
    pub async fn list_for_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<ProjectMessage>, RepositoryError> {
        let messages: Vec<ProjectMessage> = self
            .db
            .query("SELECT * FROM project_message WHERE project_id = $project_id ORDER BY seq ASC")
            .bind(("project_id", project_id.to_string()))
            .await?
            .take(0)?;
        Ok(messages)
    }
}
