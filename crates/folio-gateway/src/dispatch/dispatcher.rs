use std::sync::Arc;

use serde::Serialize;

use folio_core::protocol::inbound::InboundEvent;
use folio_core::protocol::outbound::OutboundEvent;
use folio_core::{BookId, ConnectionId, UserId};

use crate::obs::GatewayMetrics;
use crate::presence::{PresenceCounter, PresenceRegistry};
use crate::realtime::Transport;

/// Substrate room names derived from registry keys.
#[derive(Debug, Clone)]
pub struct RoomNames {
    admin: String,
    user_prefix: String,
    book_prefix: String,
}

impl RoomNames {
    pub fn new(
        admin: impl Into<String>,
        user_prefix: impl Into<String>,
        book_prefix: impl Into<String>,
    ) -> Self {
        Self {
            admin: admin.into(),
            user_prefix: user_prefix.into(),
            book_prefix: book_prefix.into(),
        }
    }

    pub fn admin(&self) -> &str {
        &self.admin
    }

    pub fn user(&self, user: &UserId) -> String {
        format!("{}{}", self.user_prefix, user)
    }

    pub fn book(&self, book: &BookId) -> String {
        format!("{}{}", self.book_prefix, book)
    }
}

impl Default for RoomNames {
    fn default() -> Self {
        Self::new("admin", "user:", "book:")
    }
}

/// Point-in-time view of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceStats {
    pub online_users: usize,
    pub connections: usize,
    pub admin_observers: usize,
    pub book_rooms: usize,
}

/// Applies inbound events to the presence registry and triggers broadcasts.
///
/// Every entry point runs to completion without suspending. Broadcasts are
/// emitted only after all mutations for the triggering event are done.
pub struct EventDispatcher<T: Transport> {
    registry: PresenceRegistry,
    counter: PresenceCounter,
    rooms: RoomNames,
    transport: T,
    metrics: Arc<GatewayMetrics>,
}

impl<T: Transport> EventDispatcher<T> {
    pub fn new(
        transport: T,
        counter: PresenceCounter,
        rooms: RoomNames,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            registry: PresenceRegistry::new(),
            counter,
            rooms,
            transport,
            metrics,
        }
    }

    pub fn registry(&self) -> &PresenceRegistry {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn online_count(&self) -> usize {
        self.counter.compute_online_count(
            &self.registry.connections,
            &self.registry.rooms,
            &self.registry.admins,
        )
    }

    pub fn stats(&self) -> PresenceStats {
        PresenceStats {
            online_users: self.online_count(),
            connections: self.registry.connections.len(),
            admin_observers: self.registry.admins.len(),
            book_rooms: self.registry.rooms.book_room_count(),
        }
    }

    pub fn connect(&mut self, conn: ConnectionId) {
        if self.registry.connections.register(conn) {
            tracing::debug!(%conn, "connected");
        } else {
            tracing::debug!(%conn, "duplicate connect ignored");
        }
        self.after_event();
    }

    /// Decode a raw text frame and apply it. Malformed frames are logged and
    /// dropped without touching the registry.
    pub fn handle_frame(&mut self, conn: ConnectionId, text: &str) {
        match InboundEvent::decode(text) {
            Ok(event) => self.handle(conn, event),
            Err(e) => {
                let code = e.client_code().as_str();
                self.metrics.malformed_frames.inc(&[("code", code)]);
                tracing::warn!(%conn, code, error = %e, "malformed event ignored");
            }
        }
    }

    pub fn handle(&mut self, conn: ConnectionId, event: InboundEvent) {
        self.metrics.inbound_events.inc(&[("event", event.name())]);

        if let InboundEvent::Error { detail } = &event {
            tracing::warn!(%conn, %detail, "client reported error");
            return;
        }
        if !self.registry.connections.contains(conn) {
            tracing::debug!(%conn, event = event.name(), "event for unknown connection ignored");
            return;
        }

        match event {
            InboundEvent::JoinUserRoom(user) => self.join_user(conn, user),
            InboundEvent::JoinAdminRoom => self.join_admin(conn),
            InboundEvent::JoinBookRoom(book) => self.join_book(conn, book),
            InboundEvent::LeaveBookRoom(book) => self.leave_book(conn, book),
            InboundEvent::Error { .. } => {}
        }
        self.after_event();
    }

    /// Error surfaced by the transport itself (read failure, protocol error).
    pub fn transport_error(&mut self, conn: ConnectionId, detail: &str) {
        tracing::warn!(%conn, %detail, "transport error");
    }

    /// Ordered cleanup: admin set, user presence, book rooms, table, then
    /// (if anything observable changed) one broadcast.
    pub fn disconnect(&mut self, conn: ConnectionId) {
        let registry = &mut self.registry;
        let Some(record) = registry.connections.get_mut(conn) else {
            tracing::debug!(%conn, "disconnect for unknown connection ignored");
            self.transport.release(conn);
            return;
        };

        let admin_changed = registry.admins.remove(conn);
        record.is_admin_observer = false;

        let went_offline = registry.rooms.disassociate_user(record);
        let left_books = registry.rooms.leave_all_books(record);
        registry.connections.remove(conn);

        self.transport.release(conn);

        if let Some(user) = &went_offline {
            tracing::info!(%conn, %user, "user offline");
        }
        tracing::debug!(%conn, admin = admin_changed, books = left_books.len(), "disconnected");

        if admin_changed || went_offline.is_some() {
            self.broadcast_online_count();
        }
        self.after_event();
    }

    fn join_user(&mut self, conn: ConnectionId, user: UserId) {
        let before = self.online_count();
        let Some(record) = self.registry.connections.get_mut(conn) else {
            return;
        };
        let assoc = self.registry.rooms.associate_user(record, user.clone());

        if let Some(old) = &assoc.replaced {
            self.transport.leave(conn, &self.rooms.user(old));
            tracing::debug!(%conn, from = %old, to = %user, "connection re-identified");
        }
        self.transport.join(conn, &self.rooms.user(&user));

        if assoc.came_online {
            tracing::info!(%conn, %user, "user online");
        }
        // An admin-only session identifying as an already-online user drops
        // out of the count without any presence transition.
        if assoc.presence_changed() || self.online_count() != before {
            self.broadcast_online_count();
        }
    }

    fn join_admin(&mut self, conn: ConnectionId) {
        let Some(record) = self.registry.connections.get_mut(conn) else {
            return;
        };
        record.is_admin_observer = true;
        let added = self.registry.admins.insert(conn);
        self.transport.join(conn, self.rooms.admin());

        if added {
            tracing::info!(%conn, observers = self.registry.admins.len(), "admin observer joined");
            self.broadcast_online_count();
        }

        let online_users = self.online_count();
        self.transport
            .emit_to_connection(conn, &OutboundEvent::CurrentStats { online_users });
    }

    fn join_book(&mut self, conn: ConnectionId, book: BookId) {
        let Some(record) = self.registry.connections.get_mut(conn) else {
            return;
        };
        if self.registry.rooms.join_book(record, &book) {
            self.transport.join(conn, &self.rooms.book(&book));
            tracing::debug!(%conn, %book, "joined book room");
        }
    }

    fn leave_book(&mut self, conn: ConnectionId, book: BookId) {
        let Some(record) = self.registry.connections.get_mut(conn) else {
            return;
        };
        if self.registry.rooms.leave_book(record, &book) {
            self.transport.leave(conn, &self.rooms.book(&book));
            tracing::debug!(%conn, %book, "left book room");
        } else {
            tracing::debug!(%conn, %book, "leave for room not joined ignored");
        }
    }

    fn broadcast_online_count(&self) {
        let count = self.online_count();
        self.transport
            .emit_to_room(self.rooms.admin(), &OutboundEvent::OnlineUsersUpdate { count });
        self.metrics
            .broadcasts
            .inc(&[("event", folio_core::protocol::names::ONLINE_USERS_UPDATE)]);
        tracing::debug!(count, observers = self.registry.admins.len(), "online count broadcast");
    }

    fn after_event(&self) {
        let count = i64::try_from(self.online_count()).unwrap_or(i64::MAX);
        self.metrics.online_users.set(&[], count);

        if cfg!(debug_assertions) {
            if let Err(e) = self.registry.verify_invariants() {
                tracing::error!(error = %e, "presence registry inconsistent");
            }
        }
    }
}
