//! Realtime substrate for the gateway.
//!
//! Owns per-connection outbound queues and substrate room membership, and
//! implements [`Transport`] so the presence dispatcher can join/leave rooms and
//! emit events without knowing about WebSockets.

pub mod core;
pub mod transport;

pub use core::{RealtimeCore, RoomFanout, SessionRegistry};
pub use transport::Transport;
