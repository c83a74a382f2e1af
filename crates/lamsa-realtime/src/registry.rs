//! Connection registry — tracks all active connections indexed by recipient.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::handle::{ConnectionHandle, ConnectionId};
use crate::message::OutboundMessage;

/// Thread-safe registry of all active WebSocket connections.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// Recipient ID → connection handles (one recipient can have several devices).
    by_recipient: DashMap<Uuid, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID → connection handle for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// Room name → member connection ids.
    rooms: DashMap<String, HashSet<ConnectionId>>,
    /// Per-recipient connection cap; oldest connections are evicted past it.
    max_per_recipient: usize,
}

impl ConnectionRegistry {
    /// Creates a new empty registry.
    pub fn new(max_per_recipient: usize) -> Self {
        Self {
            by_recipient: DashMap::new(),
            by_id: DashMap::new(),
            rooms: DashMap::new(),
            max_per_recipient,
        }
    }

    /// Adds a connection, evicting the recipient's oldest one when the
    /// per-recipient cap is exceeded.
    pub fn register(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        let mut evicted = None;
        {
            let mut conns = self.by_recipient.entry(handle.recipient_id).or_default();
            conns.push(handle.clone());
            if self.max_per_recipient > 0 && conns.len() > self.max_per_recipient {
                evicted = Some(conns.remove(0));
            }
        }
        if let Some(old) = evicted {
            tracing::debug!(
                recipient_id = %old.recipient_id,
                connection_id = %old.id,
                "Evicting oldest connection over per-recipient cap"
            );
            old.mark_dead();
            self.by_id.remove(&old.id);
        }
    }

    /// Removes a connection, including its room memberships.
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        if let Some((_, handle)) = self.by_id.remove(conn_id) {
            handle.mark_dead();
            if let Some(mut conns) = self.by_recipient.get_mut(&handle.recipient_id) {
                conns.retain(|c| c.id != *conn_id);
                if conns.is_empty() {
                    drop(conns);
                    self.by_recipient.remove(&handle.recipient_id);
                }
            }
            self.rooms.retain(|_, members| {
                members.remove(conn_id);
                !members.is_empty()
            });
            Some(handle)
        } else {
            None
        }
    }

    /// Adds a connection to a named room.
    pub fn join_room(&self, room: &str, conn_id: ConnectionId) {
        self.rooms.entry(room.to_owned()).or_default().insert(conn_id);
    }

    /// Removes a connection from a named room.
    pub fn leave_room(&self, room: &str, conn_id: &ConnectionId) {
        if let Some(mut members) = self.rooms.get_mut(room) {
            members.remove(conn_id);
            if members.is_empty() {
                drop(members);
                self.rooms.remove(room);
            }
        }
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Whether the recipient has at least one live connection.
    pub fn is_online(&self, recipient_id: &Uuid) -> bool {
        self.by_recipient
            .get(recipient_id)
            .map(|conns| conns.iter().any(|c| c.is_alive()))
            .unwrap_or(false)
    }

    /// Sends a message to every live connection of one recipient.
    ///
    /// Returns the number of connections that accepted the message.
    pub fn send_to_recipient(&self, recipient_id: &Uuid, msg: &OutboundMessage) -> usize {
        let conns = self
            .by_recipient
            .get(recipient_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        conns.iter().filter(|c| c.send(msg.clone())).count()
    }

    /// Sends a message to every member of a room.
    pub fn send_to_room(&self, room: &str, msg: &OutboundMessage) -> usize {
        let member_ids: Vec<ConnectionId> = self
            .rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default();

        member_ids
            .iter()
            .filter_map(|id| self.get(id))
            .filter(|c| c.send(msg.clone()))
            .count()
    }

    /// Sends a message to every live connection.
    pub fn broadcast(&self, msg: &OutboundMessage) -> usize {
        self.by_id
            .iter()
            .filter(|entry| entry.value().send(msg.clone()))
            .count()
    }

    /// Total number of tracked connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Number of distinct recipients with connections.
    pub fn recipient_count(&self) -> usize {
        self.by_recipient.len()
    }
}
