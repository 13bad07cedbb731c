use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use teamroom_entity::types::{ClientEvent, ServerEvent};
use tokio::sync::mpsc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, error};

use crate::auth::AuthenticatedUser;
use crate::gateway::GatewaySession;
use crate::state::AppState;

/// `GET /ws`. The session extractor runs before the upgrade, so a bad token
/// is answered with 401 and no socket is ever opened.
pub async fn websocket_handler(
    auth: AuthenticatedUser,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, auth.user_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: String) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(state.config.connection_buffer);

    let mut session = GatewaySession::new(
        user_id,
        tx.clone(),
        state.resolver.clone(),
        state.registry.clone(),
        state.router.clone(),
    );
    let connection_id = session.context().connection_id;

    // Single writer: replies, broadcasts and pings all go through `rx`
    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize server event: {}", e);
                    continue;
                },
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let ping_tx = tx.clone();
    let ping_period = Duration::from_secs(state.config.ping_interval_secs);
    let ping_task = tokio::spawn(async move {
        let mut ticker = interval(ping_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let ping = ServerEvent::Ping { timestamp: Utc::now().timestamp_millis() };
            if ping_tx.send(ping).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        let reply = match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(text.as_str()) {
                Ok(event) => session.handle(event).await,
                Err(e) => GatewaySession::malformed(e),
            },
            Ok(Message::Binary(_)) => GatewaySession::malformed("binary frames are not supported"),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!(%connection_id, "WebSocket receive error: {}", e);
                break;
            },
        };
        if tx.send(reply).await.is_err() {
            break;
        }
    }

    session.disconnect();
    drop(session);
    ping_task.abort();
    drop(tx);
    // Every sender is gone now, so the writer drains what is queued and stops
    if let Err(e) = send_task.await {
        debug!(%connection_id, "Writer task ended abnormally: {}", e);
    }
}
