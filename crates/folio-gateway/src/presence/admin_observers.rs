use std::collections::HashSet;

use folio_core::ConnectionId;

/// Connections that joined the admin broadcast channel.
#[derive(Debug, Default)]
pub struct AdminObserverSet {
    members: HashSet<ConnectionId>,
}

impl AdminObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the connection was not yet observing.
    pub fn insert(&mut self, id: ConnectionId) -> bool {
        self.members.insert(id)
    }

    /// Returns true if the connection was observing.
    pub fn remove(&mut self, id: ConnectionId) -> bool {
        self.members.remove(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members.iter().copied()
    }
}
