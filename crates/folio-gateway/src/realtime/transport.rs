use std::sync::Arc;

use folio_core::protocol::outbound::OutboundEvent;
use folio_core::ConnectionId;

/// What the presence dispatcher needs from the message substrate.
///
/// Every method is synchronous and must not block: the dispatcher calls these
/// while it is the only writer of the registry.
pub trait Transport: Send + Sync {
    fn join(&self, conn: ConnectionId, room: &str);
    fn leave(&self, conn: ConnectionId, room: &str);
    fn emit_to_room(&self, room: &str, event: &OutboundEvent);
    fn emit_to_connection(&self, conn: ConnectionId, event: &OutboundEvent);
    /// Forget the connection: drop all of its room memberships and its outbound queue.
    fn release(&self, conn: ConnectionId);
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn join(&self, conn: ConnectionId, room: &str) {
        (**self).join(conn, room)
    }

    fn leave(&self, conn: ConnectionId, room: &str) {
        (**self).leave(conn, room)
    }

    fn emit_to_room(&self, room: &str, event: &OutboundEvent) {
        (**self).emit_to_room(room, event)
    }

    fn emit_to_connection(&self, conn: ConnectionId, event: &OutboundEvent) {
        (**self).emit_to_connection(conn, event)
    }

    fn release(&self, conn: ConnectionId) {
        (**self).release(conn)
    }
}
