use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;

use std::sync::atomic::{AtomicU64, Ordering};

use folio_core::ConnectionId;

/// One connection's outbound queue sender.
#[derive(Clone)]
pub struct Outbox {
    pub tx: mpsc::Sender<Message>,
}

/// Session registry: `ConnectionId -> Outbox`. Also hands out connection ids.
pub struct SessionRegistry {
    sessions: DashMap<ConnectionId, Outbox>,
    seq: AtomicU64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    /// Allocate a fresh id and store its outbox.
    pub fn insert(&self, outbox: Outbox) -> ConnectionId {
        let id = ConnectionId::new(self.seq.fetch_add(1, Ordering::Relaxed));
        self.sessions.insert(id, outbox);
        id
    }

    pub fn remove(&self, id: ConnectionId) -> Option<Outbox> {
        self.sessions.remove(&id).map(|(_, outbox)| outbox)
    }

    pub fn get(&self, id: ConnectionId) -> Option<Outbox> {
        self.sessions.get(&id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
