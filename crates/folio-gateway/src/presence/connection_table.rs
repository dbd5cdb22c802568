use std::collections::{HashMap, HashSet};

use folio_core::{BookId, ConnectionId, UserId};

/// One live transport session as the registry sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    /// Set by `joinUserRoom`.
    pub user_id: Option<UserId>,
    pub is_admin_observer: bool,
    pub book_rooms: HashSet<BookId>,
}

impl Connection {
    fn new(id: ConnectionId) -> Self {
        Self {
            id,
            user_id: None,
            is_admin_observer: false,
            book_rooms: HashSet::new(),
        }
    }
}

/// Authoritative record of every live connection.
#[derive(Debug, Default)]
pub struct ConnectionTable {
    conns: HashMap<ConnectionId, Connection>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record. Returns false (and leaves the existing record
    /// untouched) if the id is already registered.
    pub fn register(&mut self, id: ConnectionId) -> bool {
        if self.conns.contains_key(&id) {
            return false;
        }
        self.conns.insert(id, Connection::new(id));
        true
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.conns.get(&id)
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.conns.get_mut(&id)
    }

    /// Drop the record. Callers must already have unlinked it from every index.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        self.conns.remove(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.conns.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.conns.values()
    }
}
