//! Shared helpers: a transport that records every call.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use folio_core::protocol::outbound::OutboundEvent;
use folio_core::ConnectionId;
use folio_gateway::dispatch::{EventDispatcher, RoomNames};
use folio_gateway::obs::GatewayMetrics;
use folio_gateway::presence::{CountPolicy, PresenceCounter};
use folio_gateway::realtime::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    Room {
        room: String,
        recipients: Vec<ConnectionId>,
        event: OutboundEvent,
    },
    Direct {
        conn: ConnectionId,
        event: OutboundEvent,
    },
}

#[derive(Default)]
struct Inner {
    rooms: HashMap<String, BTreeSet<ConnectionId>>,
    emitted: Vec<Emitted>,
    released: Vec<ConnectionId>,
}

#[derive(Default)]
pub struct RecordingTransport {
    inner: Mutex<Inner>,
}

impl RecordingTransport {
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        let inner = self.inner.lock().unwrap();
        inner
            .rooms
            .get(room)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn emitted(&self) -> Vec<Emitted> {
        self.inner.lock().unwrap().emitted.clone()
    }

    pub fn released(&self) -> Vec<ConnectionId> {
        self.inner.lock().unwrap().released.clone()
    }

    /// Everything a connection would have received, in order.
    pub fn received_by(&self, conn: ConnectionId) -> Vec<OutboundEvent> {
        self.emitted()
            .into_iter()
            .filter_map(|e| match e {
                Emitted::Room { recipients, event, .. } if recipients.contains(&conn) => Some(event),
                Emitted::Direct { conn: to, event } if to == conn => Some(event),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().emitted.clear();
    }
}

impl Transport for RecordingTransport {
    fn join(&self, conn: ConnectionId, room: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.rooms.entry(room.to_string()).or_default().insert(conn);
    }

    fn leave(&self, conn: ConnectionId, room: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(set) = inner.rooms.get_mut(room) {
            set.remove(&conn);
            if set.is_empty() {
                inner.rooms.remove(room);
            }
        }
    }

    fn emit_to_room(&self, room: &str, event: &OutboundEvent) {
        let mut inner = self.inner.lock().unwrap();
        let recipients = inner
            .rooms
            .get(room)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        inner.emitted.push(Emitted::Room {
            room: room.to_string(),
            recipients,
            event: *event,
        });
    }

    fn emit_to_connection(&self, conn: ConnectionId, event: &OutboundEvent) {
        let mut inner = self.inner.lock().unwrap();
        inner.emitted.push(Emitted::Direct { conn, event: *event });
    }

    fn release(&self, conn: ConnectionId) {
        let mut inner = self.inner.lock().unwrap();
        inner.rooms.retain(|_, set| {
            set.remove(&conn);
            !set.is_empty()
        });
        inner.released.push(conn);
    }
}

pub type TestDispatcher = EventDispatcher<Arc<RecordingTransport>>;

pub fn dispatcher(policy: CountPolicy) -> TestDispatcher {
    EventDispatcher::new(
        Arc::new(RecordingTransport::default()),
        PresenceCounter::new(policy),
        RoomNames::default(),
        Arc::new(GatewayMetrics::default()),
    )
}

pub fn c(n: u64) -> ConnectionId {
    ConnectionId::new(n)
}

/// Build an inbound text frame.
pub fn frame(event: &str, data: serde_json::Value) -> String {
    serde_json::json!({ "v": 1, "event": event, "data": data }).to_string()
}

pub fn join_user(d: &mut TestDispatcher, conn: ConnectionId, user: &str) {
    d.handle_frame(conn, &frame("joinUserRoom", serde_json::json!(user)));
}

pub fn join_admin(d: &mut TestDispatcher, conn: ConnectionId) {
    d.handle_frame(conn, &frame("joinAdminRoom", serde_json::Value::Null));
}

pub fn join_book(d: &mut TestDispatcher, conn: ConnectionId, book: &str) {
    d.handle_frame(conn, &frame("joinBookRoom", serde_json::json!(book)));
}

pub fn leave_book(d: &mut TestDispatcher, conn: ConnectionId, book: &str) {
    d.handle_frame(conn, &frame("leaveBookRoom", serde_json::json!(book)));
}

pub fn assert_consistent(d: &TestDispatcher) {
    if let Err(e) = d.registry().verify_invariants() {
        panic!("{e}");
    }
}
