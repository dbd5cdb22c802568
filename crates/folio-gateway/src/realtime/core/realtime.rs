use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Message;
use tokio::sync::mpsc;

use folio_core::protocol::outbound::OutboundEvent;
use folio_core::ConnectionId;

use crate::realtime::core::{Outbox, RoomFanout, SessionRegistry};
use crate::realtime::transport::Transport;

/// RealtimeCore: egress engine (send to connection / publish to room).
///
/// Delivery is lossy: a full outbound queue drops the frame instead of
/// stalling the caller.
pub struct RealtimeCore {
    pub sessions: SessionRegistry,
    pub rooms: RoomFanout,
    egress_drops: AtomicU64,
}

impl Default for RealtimeCore {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeCore {
    pub fn new() -> Self {
        Self {
            sessions: SessionRegistry::new(),
            rooms: RoomFanout::new(),
            egress_drops: AtomicU64::new(0),
        }
    }

    /// Register a new connection and return its id with the receiving end
    /// of its outbound queue.
    pub fn open_session(&self, queue: usize) -> (ConnectionId, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(queue.max(1));
        let id = self.sessions.insert(Outbox { tx });
        (id, rx)
    }

    pub fn egress_drop_count(&self) -> u64 {
        self.egress_drops.load(Ordering::Relaxed)
    }

    fn deliver(&self, conn: ConnectionId, text: &str) {
        let Some(outbox) = self.sessions.get(conn) else {
            return;
        };
        if outbox.tx.try_send(Message::Text(text.to_owned())).is_err() {
            self.egress_drops.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%conn, "outbound queue full or closed, frame dropped");
        }
    }

    fn encode(event: &OutboundEvent) -> Option<String> {
        match event.encode() {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::error!(event = event.name(), error = %e, "outbound encode failed");
                None
            }
        }
    }
}

impl Transport for RealtimeCore {
    fn join(&self, conn: ConnectionId, room: &str) {
        self.rooms.join(room, conn);
    }

    fn leave(&self, conn: ConnectionId, room: &str) {
        self.rooms.leave(room, conn);
    }

    fn emit_to_room(&self, room: &str, event: &OutboundEvent) {
        // serialize once, send N times
        let Some(text) = Self::encode(event) else {
            return;
        };
        for conn in self.rooms.members(room) {
            self.deliver(conn, &text);
        }
    }

    fn emit_to_connection(&self, conn: ConnectionId, event: &OutboundEvent) {
        if let Some(text) = Self::encode(event) {
            self.deliver(conn, &text);
        }
    }

    fn release(&self, conn: ConnectionId) {
        self.rooms.cleanup_connection(conn);
        self.sessions.remove(conn);
    }
}
