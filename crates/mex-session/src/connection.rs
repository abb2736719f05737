use crate::message::ServerMessage;
use mex_core::{Position, ID};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

/// Marker type for [`ID<Connection>`] — one bidirectional message channel
/// bound to an identity and, once joined, a match plus a role.
#[derive(Debug)]
pub struct Connection;

/// What a connection is allowed to see and do once joined to a match.
///
/// A seat position, not a bare name, is the role's identity so a human
/// reconnect can never collide with an AI seat that happens to share a
/// display name.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConnectionRole {
    /// Attached but not yet declared as a player or spectator — the state
    /// between a connection opening and its first `join_game`/`spectate_game`.
    Pending,
    Player(Position),
    Spectator,
}

struct Entry {
    sender: UnboundedSender<ServerMessage>,
    role: ConnectionRole,
}

/// Per-match registry of live connections. One identity may hold multiple
/// concurrent connections to the same match — each gets its
/// own entry, and a seat can be unicast to by iterating every connection
/// whose role names that seat.
#[derive(Debug, Default)]
pub struct ConnectionTable {
    entries: HashMap<ID<Connection>, Entry>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: ID<Connection>, sender: UnboundedSender<ServerMessage>, role: ConnectionRole) {
        self.entries.insert(id, Entry { sender, role });
    }

    pub fn remove(&mut self, id: ID<Connection>) -> Option<ConnectionRole> {
        self.entries.remove(&id).map(|e| e.role)
    }

    pub fn role(&self, id: ID<Connection>) -> Option<ConnectionRole> {
        self.entries.get(&id).map(|e| e.role)
    }

    /// Reassigns a connection's role without touching its sender — used
    /// when a pending connection declares itself via `join_game` or
    /// `spectate_game`.
    pub fn set_role(&mut self, id: ID<Connection>, role: ConnectionRole) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.role = role;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sends one message to a single connection.
    pub fn unicast(&self, id: ID<Connection>, message: ServerMessage) {
        if let Some(entry) = self.entries.get(&id) {
            if entry.sender.send(message).is_err() {
                log::debug!("[connections] unicast to a closed connection dropped");
            }
        }
    }

    /// Sends a message to every connection currently seated as `seat`.
    pub fn send_to_seat(&self, seat: Position, message: ServerMessage) {
        for entry in self.entries.values() {
            if entry.role == ConnectionRole::Player(seat) {
                let _ = entry.sender.send(message.clone());
            }
        }
    }

    /// Sends a message to every spectator connection.
    pub fn send_to_spectators(&self, message: ServerMessage) {
        for entry in self.entries.values() {
            if entry.role == ConnectionRole::Spectator {
                let _ = entry.sender.send(message.clone());
            }
        }
    }

    /// Calls `build` once per distinct seat with a live connection, sending
    /// each the personalized message it returns. Used for broadcasts whose
    /// payload must hide other players' hands.
    pub fn broadcast_per_seat(&self, mut build: impl FnMut(Position) -> ServerMessage) {
        let mut seen = std::collections::HashSet::new();
        for entry in self.entries.values() {
            if let ConnectionRole::Player(seat) = entry.role {
                if seen.insert(seat) {
                    let message = build(seat);
                    self.send_to_seat(seat, message);
                }
            }
        }
    }

    pub fn connected_seats(&self) -> std::collections::HashSet<Position> {
        self.entries
            .values()
            .filter_map(|e| match e.role {
                ConnectionRole::Player(p) => Some(p),
                ConnectionRole::Spectator | ConnectionRole::Pending => None,
            })
            .collect()
    }

    pub fn spectator_count(&self) -> usize {
        self.entries.values().filter(|e| e.role == ConnectionRole::Spectator).count()
    }

    pub fn connection_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicast_and_broadcast_respect_role() {
        let mut table = ConnectionTable::new();
        let (tx_a, mut rx_a) = tokio::sync::mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = tokio::sync::mpsc::unbounded_channel();
        let a: ID<Connection> = ID::default();
        let b: ID<Connection> = ID::default();
        table.add(a, tx_a, ConnectionRole::Player(0));
        table.add(b, tx_b, ConnectionRole::Spectator);

        table.send_to_seat(0, ServerMessage::Error { kind: "x".into(), message: "y".into() });
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());

        table.send_to_spectators(ServerMessage::Error { kind: "x".into(), message: "y".into() });
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn multiple_connections_to_one_seat_both_receive() {
        let mut table = ConnectionTable::new();
        let (tx_a, mut rx_a) = tokio::sync::mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = tokio::sync::mpsc::unbounded_channel();
        let a: ID<Connection> = ID::default();
        let b: ID<Connection> = ID::default();
        table.add(a, tx_a, ConnectionRole::Player(2));
        table.add(b, tx_b, ConnectionRole::Player(2));

        table.send_to_seat(2, ServerMessage::Error { kind: "x".into(), message: "y".into() });
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }
}
