//! Presence registry: connection table, room/user indices, admin observers,
//! and the online counter derived from them.
//!
//! The registry is plain owned data with no interior mutability. Exactly one
//! owner (the dispatcher task) mutates it, so each event is applied atomically
//! with respect to every other event.

mod admin_observers;
mod connection_table;
mod counter;
mod room_index;

pub use admin_observers::AdminObserverSet;
pub use connection_table::{Connection, ConnectionTable};
pub use counter::{CountPolicy, PresenceCounter};
pub use room_index::{Association, RoomIndex};

use folio_core::error::{FolioError, Result};

/// All presence state, kept together so consistency can be checked as a unit.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    pub connections: ConnectionTable,
    pub rooms: RoomIndex,
    pub admins: AdminObserverSet,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cross-check the indices against the connection table.
    pub fn verify_invariants(&self) -> Result<()> {
        for conn in self.connections.iter() {
            if let Some(user) = &conn.user_id {
                let linked = self
                    .rooms
                    .user_connections(user)
                    .is_some_and(|s| s.contains(&conn.id));
                if !linked {
                    return Err(violation(format!("{} missing from user {user}", conn.id)));
                }
            }
            for book in &conn.book_rooms {
                let linked = self
                    .rooms
                    .book_members(book)
                    .is_some_and(|s| s.contains(&conn.id));
                if !linked {
                    return Err(violation(format!("{} missing from book {book}", conn.id)));
                }
            }
            if conn.is_admin_observer != self.admins.contains(conn.id) {
                return Err(violation(format!("{} admin flag out of sync", conn.id)));
            }
        }

        for (user, members) in self.rooms.users() {
            if members.is_empty() {
                return Err(violation(format!("empty presence entry for {user}")));
            }
            for id in members {
                let owner = self.connections.get(*id).and_then(|c| c.user_id.as_ref());
                if owner != Some(user) {
                    return Err(violation(format!("{id} listed under user {user}")));
                }
            }
        }

        for (book, members) in self.rooms.books() {
            if members.is_empty() {
                return Err(violation(format!("empty book room {book}")));
            }
            for id in members {
                let joined = self
                    .connections
                    .get(*id)
                    .is_some_and(|c| c.book_rooms.contains(book));
                if !joined {
                    return Err(violation(format!("{id} listed in book {book}")));
                }
            }
        }

        for id in self.admins.iter() {
            if !self.connections.get(id).is_some_and(|c| c.is_admin_observer) {
                return Err(violation(format!("{id} in admin set without record")));
            }
        }

        Ok(())
    }
}

fn violation(msg: String) -> FolioError {
    FolioError::Internal(format!("presence invariant violated: {msg}"))
}
