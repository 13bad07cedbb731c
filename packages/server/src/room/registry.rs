use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use teamroom_entity::types::ServerEvent;
use teamroom_surrealdb::repository::{ProjectLockGuard, ProjectLocks};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};
use uuid::Uuid;

struct Subscriber {
    user_id: String,
    tx: mpsc::Sender<ServerEvent>,
}

/// Live subscriber sets, one per project room.
///
/// Fan-out never waits on a subscriber: each connection has a bounded
/// outbound queue and a full queue loses that one event.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<String, HashMap<Uuid, Subscriber>>>,
    lanes: ProjectLocks,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes join, send and revoke for one room
    pub async fn lane(&self, project_id: &str) -> ProjectLockGuard {
        self.lanes.lock(project_id).await
    }

    #[cfg(test)]
    pub(crate) fn busy_lanes(&self) -> usize {
        self.lanes.len()
    }

    pub fn join(
        &self,
        project_id: &str,
        connection_id: Uuid,
        user_id: &str,
        tx: mpsc::Sender<ServerEvent>,
    ) {
        self.rooms
            .entry(project_id.to_string())
            .or_default()
            .insert(connection_id, Subscriber { user_id: user_id.to_string(), tx });
        debug!(project_id, %connection_id, user_id, "Connection joined room");
    }

    pub fn leave(&self, project_id: &str, connection_id: Uuid) -> bool {
        let removed = match self.rooms.get_mut(project_id) {
            Some(mut room) => room.remove(&connection_id).is_some(),
            None => false,
        };
        self.rooms.remove_if(project_id, |_, room| room.is_empty());
        if removed {
            debug!(project_id, %connection_id, "Connection left room");
        }
        removed
    }

    pub fn leave_all<'a>(&self, connection_id: Uuid, project_ids: impl IntoIterator<Item = &'a String>) {
        for project_id in project_ids {
            self.leave(project_id, connection_id);
        }
    }

    pub fn is_subscribed(&self, project_id: &str, connection_id: Uuid) -> bool {
        self.rooms
            .get(project_id)
            .is_some_and(|room| room.contains_key(&connection_id))
    }

    pub fn subscriber_count(&self, project_id: &str) -> usize {
        self.rooms.get(project_id).map(|room| room.len()).unwrap_or(0)
    }

    /// Enqueue `event` for every subscriber of the room. Returns how many queues accepted it.
    pub fn broadcast(&self, project_id: &str, event: &ServerEvent) -> usize {
        let mut delivered = 0;
        if let Some(mut room) = self.rooms.get_mut(project_id) {
            room.retain(|connection_id, subscriber| match subscriber.tx.try_send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                },
                Err(TrySendError::Full(_)) => {
                    warn!(
                        project_id,
                        %connection_id,
                        user_id = %subscriber.user_id,
                        "Outbound queue full, dropping event for subscriber"
                    );
                    true
                },
                Err(TrySendError::Closed(_)) => {
                    debug!(project_id, %connection_id, "Dropping closed subscriber");
                    false
                },
            });
        }
        self.rooms.remove_if(project_id, |_, room| room.is_empty());
        delivered
    }

    /// Drop every connection of `user_id` from the room and tell each of them why.
    pub fn revoke(&self, project_id: &str, user_id: &str) -> usize {
        let mut revoked = 0;
        if let Some(mut room) = self.rooms.get_mut(project_id) {
            room.retain(|connection_id, subscriber| {
                if subscriber.user_id != user_id {
                    return true;
                }
                let notice = ServerEvent::MembershipRevoked { project_id: project_id.to_string() };
                if subscriber.tx.try_send(notice).is_err() {
                    debug!(project_id, %connection_id, "Revocation notice not delivered");
                }
                revoked += 1;
                false
            });
        }
        self.rooms.remove_if(project_id, |_, room| room.is_empty());
        if revoked > 0 {
            info!(project_id, user_id, connections = revoked, "Revoked room subscriptions");
        }
        revoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping(timestamp: i64) -> ServerEvent {
        ServerEvent::Ping { timestamp }
    }

    #[test]
    fn broadcast_reaches_every_subscriber() {
        let registry = RoomRegistry::new();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        registry.join("p1", Uuid::new_v4(), "a", tx_a);
        registry.join("p1", Uuid::new_v4(), "b", tx_b);

        assert_eq!(registry.broadcast("p1", &ping(1)), 2);
        assert_eq!(rx_a.try_recv().unwrap(), ping(1));
        assert_eq!(rx_b.try_recv().unwrap(), ping(1));
        assert_eq!(registry.broadcast("p2", &ping(2)), 0);
    }

    #[test]
    fn full_queue_drops_event_but_keeps_subscriber() {
        let registry = RoomRegistry::new();
        let slow = Uuid::new_v4();
        let (tx_slow, mut rx_slow) = mpsc::channel(1);
        let (tx_fast, mut rx_fast) = mpsc::channel(4);
        registry.join("p1", slow, "slow", tx_slow);
        registry.join("p1", Uuid::new_v4(), "fast", tx_fast);

        registry.broadcast("p1", &ping(1));
        assert_eq!(registry.broadcast("p1", &ping(2)), 1);

        assert!(registry.is_subscribed("p1", slow));
        assert_eq!(rx_slow.try_recv().unwrap(), ping(1));
        assert!(rx_slow.try_recv().is_err());
        assert_eq!(rx_fast.try_recv().unwrap(), ping(1));
        assert_eq!(rx_fast.try_recv().unwrap(), ping(2));
    }

    #[test]
    fn closed_queue_unsubscribes() {
        let registry = RoomRegistry::new();
        let gone = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(4);
        registry.join("p1", gone, "a", tx);
        drop(rx);

        assert_eq!(registry.broadcast("p1", &ping(1)), 0);
        assert!(!registry.is_subscribed("p1", gone));
        assert_eq!(registry.subscriber_count("p1"), 0);
    }

    #[test]
    fn revoke_targets_only_that_user() {
        let registry = RoomRegistry::new();
        let (tx_x1, mut rx_x1) = mpsc::channel(4);
        let (tx_x2, _rx_x2) = mpsc::channel(4);
        let (tx_y, mut rx_y) = mpsc::channel(4);
        let x1 = Uuid::new_v4();
        registry.join("p1", x1, "x", tx_x1);
        registry.join("p1", Uuid::new_v4(), "x", tx_x2);
        registry.join("p1", Uuid::new_v4(), "y", tx_y);

        assert_eq!(registry.revoke("p1", "x"), 2);
        assert!(!registry.is_subscribed("p1", x1));
        assert_eq!(registry.subscriber_count("p1"), 1);
        assert_eq!(
            rx_x1.try_recv().unwrap(),
            ServerEvent::MembershipRevoked { project_id: "p1".to_string() }
        );
        assert!(rx_y.try_recv().is_err());
    }

    #[test]
    fn leave_all_is_idempotent() {
        let registry = RoomRegistry::new();
        let connection = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(4);
        registry.join("p1", connection, "a", tx.clone());
        registry.join("p2", connection, "a", tx);

        let rooms = vec!["p1".to_string(), "p2".to_string()];
        registry.leave_all(connection, &rooms);
        registry.leave_all(connection, &rooms);

        assert_eq!(registry.subscriber_count("p1"), 0);
        assert_eq!(registry.subscriber_count("p2"), 0);
    }
}
