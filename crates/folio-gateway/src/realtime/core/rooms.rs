use dashmap::{DashMap, DashSet};

use folio_core::ConnectionId;

/// Substrate room membership: room -> connections, connection -> rooms.
///
/// This is the fanout table used to deliver events; the presence registry is
/// the source of truth for who is where.
#[derive(Default)]
pub struct RoomFanout {
    room_to_conns: DashMap<String, DashSet<ConnectionId>>,
    conn_to_rooms: DashMap<ConnectionId, DashSet<String>>,
}

impl RoomFanout {
    pub fn new() -> Self {
        Self {
            room_to_conns: DashMap::new(),
            conn_to_rooms: DashMap::new(),
        }
    }

    pub fn join(&self, room: &str, conn: ConnectionId) {
        self.room_to_conns
            .entry(room.to_string())
            .or_default()
            .insert(conn);

        self.conn_to_rooms
            .entry(conn)
            .or_default()
            .insert(room.to_string());
    }

    pub fn leave(&self, room: &str, conn: ConnectionId) {
        self.remove_from_room(room, conn);
        if let Some(set) = self.conn_to_rooms.get(&conn) {
            set.remove(room);
            if set.is_empty() {
                drop(set);
                self.conn_to_rooms.remove(&conn);
            }
        }
    }

    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.room_to_conns
            .get(room)
            .map(|set| set.iter().map(|c| *c.key()).collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.room_to_conns.len()
    }

    /// Drop every membership of `conn`.
    pub fn cleanup_connection(&self, conn: ConnectionId) {
        if let Some((_, rooms)) = self.conn_to_rooms.remove(&conn) {
            for r in rooms.iter() {
                self.remove_from_room(r.key(), conn);
            }
        }
    }

    fn remove_from_room(&self, room: &str, conn: ConnectionId) {
        if let Some(set) = self.room_to_conns.get(room) {
            set.remove(&conn);
            if set.is_empty() {
                drop(set);
                self.room_to_conns.remove(room);
            }
        }
    }
}
