use std::collections::HashSet;

use teamroom_entity::types::{Ack, ClientAction, ClientEvent, ServerEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::room::{AuthorizationResolver, BroadcastRouter, RoomRegistry};

/// State owned by one live connection, created at handshake
#[derive(Debug)]
pub struct ConnectionContext {
    pub connection_id: Uuid,
    pub user_id: String,
    joined: HashSet<String>,
}

impl ConnectionContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { connection_id: Uuid::new_v4(), user_id: user_id.into(), joined: HashSet::new() }
    }

    pub fn joined(&self) -> &HashSet<String> {
        &self.joined
    }
}

/// Handles the client requests of one connection, one at a time.
///
/// Independent of the transport: the socket loop feeds it decoded events and
/// writes back whatever it returns. Room traffic arrives through `outbound`.
pub struct GatewaySession {
    context: ConnectionContext,
    outbound: mpsc::Sender<ServerEvent>,
    resolver: AuthorizationResolver,
    registry: RoomRegistry,
    router: BroadcastRouter,
    closed: bool,
}

impl GatewaySession {
    pub fn new(
        user_id: impl Into<String>,
        outbound: mpsc::Sender<ServerEvent>,
        resolver: AuthorizationResolver,
        registry: RoomRegistry,
        router: BroadcastRouter,
    ) -> Self {
        let context = ConnectionContext::new(user_id);
        info!(connection_id = %context.connection_id, user_id = %context.user_id, "Connection opened");
        Self { context, outbound, resolver, registry, router, closed: false }
    }

    pub fn context(&self) -> &ConnectionContext {
        &self.context
    }

    /// Answer one client request with `ack` or `rejected`
    pub async fn handle(&mut self, event: ClientEvent) -> ServerEvent {
        // Forced leaves happen outside this connection; catch up first
        let connection_id = self.context.connection_id;
        let registry = &self.registry;
        self.context.joined.retain(|project_id| registry.is_subscribed(project_id, connection_id));

        let action = event.action();
        let project_id = event.project_id().to_string();
        let outcome = match event {
            ClientEvent::JoinProject { project_id } => self.join(&project_id).await,
            ClientEvent::LeaveProject { project_id } => {
                self.leave(&project_id);
                Ok(())
            },
            ClientEvent::SendMessage { project_id, message_text } => {
                self.router
                    .send(&project_id, &self.context.user_id, &message_text)
                    .await
                    .map(|_| ())
            },
        };

        match outcome {
            Ok(()) => ServerEvent::Ack(Ack { action, project_id }),
            Err(err) => {
                debug!(
                    connection_id = %self.context.connection_id,
                    ?action,
                    project_id = %project_id,
                    errcode = err.errcode(),
                    "Client request rejected"
                );
                ServerEvent::Rejected(err.to_rejection(Some(action), Some(project_id)))
            },
        }
    }

    /// Reply for a frame that could not be decoded
    pub fn malformed(reason: impl std::fmt::Display) -> ServerEvent {
        ServerEvent::Rejected(
            ApiError::bad_request(format!("malformed frame: {}", reason)).to_rejection(None, None),
        )
    }

    async fn join(&mut self, project_id: &str) -> Result<(), ApiError> {
        if self.context.joined.contains(project_id) {
            return Ok(());
        }

        self.resolver.resolve_existing(project_id, &self.context.user_id).await?;

        // Held across the check and the insert so a concurrent removal cannot slip between them
        let _lane = self.registry.lane(project_id).await;

        let permissions = self.resolver.resolve(project_id, &self.context.user_id).await?;
        if !permissions.can_message {
            warn!(
                connection_id = %self.context.connection_id,
                user_id = %self.context.user_id,
                project_id,
                "Join refused: not an accepted member"
            );
            return Err(ApiError::forbidden("only accepted members can join the project room"));
        }

        self.registry.join(
            project_id,
            self.context.connection_id,
            &self.context.user_id,
            self.outbound.clone(),
        );
        self.context.joined.insert(project_id.to_string());
        Ok(())
    }

    fn leave(&mut self, project_id: &str) {
        self.context.joined.remove(project_id);
        self.registry.leave(project_id, self.context.connection_id);
    }

    /// Drop out of every room. Safe to call more than once.
    pub fn disconnect(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.registry.leave_all(self.context.connection_id, &self.context.joined);
        self.context.joined.clear();
        info!(
            connection_id = %self.context.connection_id,
            user_id = %self.context.user_id,
            "Connection closed"
        );
    }
}

impl Drop for GatewaySession {
    fn drop(&mut self) {
        self.disconnect();
    }
}
