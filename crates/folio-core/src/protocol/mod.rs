//! Wire protocol between clients and the presence gateway.
//!
//! Every text frame is a small JSON envelope naming an event. Inbound frames
//! are decoded once at the boundary into the closed [`inbound::InboundEvent`]
//! variant; a payload that does not validate never reaches the registry.
//! Outbound events are encoded with the same envelope shape.

pub mod envelope;
pub mod inbound;
pub mod outbound;

/// Only protocol version understood by this build.
pub const PROTOCOL_VERSION: u8 = 1;

/// Inbound and outbound event names (fixed API).
pub mod names {
    pub const JOIN_USER_ROOM: &str = "joinUserRoom";
    pub const JOIN_ADMIN_ROOM: &str = "joinAdminRoom";
    pub const JOIN_BOOK_ROOM: &str = "joinBookRoom";
    pub const LEAVE_BOOK_ROOM: &str = "leaveBookRoom";
    pub const ERROR: &str = "error";

    pub const ONLINE_USERS_UPDATE: &str = "onlineUsersUpdate";
    pub const CURRENT_STATS: &str = "currentStats";
}
