use surrealdb::engine::any::Any;
use teamroom_entity::types::{NewMessage, ProjectMessage, ServerEvent};
use teamroom_surrealdb::repository::{MessageRepository, UserProfileRepository};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::room::{AuthorizationResolver, RoomRegistry};

/// Authorizes, persists and fans out chat messages.
///
/// For one room the three steps run inside the room's lane, so the order in
/// which subscribers see messages is the order of their `seq`.
#[derive(Clone)]
pub struct BroadcastRouter {
    resolver: AuthorizationResolver,
    messages: MessageRepository<Any>,
    profiles: UserProfileRepository<Any>,
    registry: RoomRegistry,
    max_message_length: usize,
}

impl BroadcastRouter {
    pub fn new(
        resolver: AuthorizationResolver,
        messages: MessageRepository<Any>,
        profiles: UserProfileRepository<Any>,
        registry: RoomRegistry,
        max_message_length: usize,
    ) -> Self {
        Self { resolver, messages, profiles, registry, max_message_length }
    }

    pub async fn send(
        &self,
        project_id: &str,
        sender_id: &str,
        message_text: &str,
    ) -> Result<NewMessage, ApiError> {
        let text = message_text.trim();
        if text.is_empty() {
            return Err(ApiError::bad_request("message_text must not be empty"));
        }
        if text.chars().count() > self.max_message_length {
            return Err(ApiError::bad_request(format!(
                "message_text exceeds {} characters",
                self.max_message_length
            )));
        }

        // Unknown ids never reach the lane table
        self.resolver.resolve_existing(project_id, sender_id).await?;

        let _lane = self.registry.lane(project_id).await;

        // Earlier join-time checks are not trusted
        let permissions = self.resolver.resolve(project_id, sender_id).await?;
        if !permissions.can_message {
            warn!(project_id, sender_id, "Send refused: not an accepted member");
            return Err(ApiError::forbidden("only accepted members can send messages"));
        }

        let message = self.messages.append(project_id, sender_id, text).await?;
        let payload = NewMessage::from_message(&message, self.sender_name(&message).await);

        let delivered = self.registry.broadcast(project_id, &ServerEvent::NewMessage(payload.clone()));
        info!(
            project_id,
            sender_id,
            seq = message.seq,
            delivered,
            "Message persisted and broadcast"
        );
        Ok(payload)
    }

    /// Full history in `seq` order, for accepted members only
    pub async fn history(
        &self,
        project_id: &str,
        reader_id: &str,
    ) -> Result<Vec<ProjectMessage>, ApiError> {
        let permissions = self.resolver.resolve_existing(project_id, reader_id).await?;
        if !permissions.can_message {
            return Err(ApiError::forbidden("only accepted members can read the history"));
        }
        Ok(self.messages.list_for_project(project_id).await?)
    }

    async fn sender_name(&self, message: &ProjectMessage) -> String {
        match self.profiles.display_name(&message.sender_id).await {
            Ok(name) => name,
            Err(e) => {
                debug!(sender_id = %message.sender_id, "Profile lookup failed: {}", e);
                message.sender_id.clone()
            },
        }
    }
}
