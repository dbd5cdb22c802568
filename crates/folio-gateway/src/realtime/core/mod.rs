//! Realtime core components for the gateway substrate.
//!
//! Session registry (outbound queues), substrate room fanout, and the
//! `RealtimeCore` that ties them together behind the `Transport` trait.

mod realtime;
mod rooms;
mod session_registry;

pub use realtime::RealtimeCore;
pub use rooms::RoomFanout;
pub use session_registry::{Outbox, SessionRegistry};
