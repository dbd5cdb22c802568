//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler and the frame classifier that sorts raw
//! messages before they are forwarded to the presence dispatcher.

pub mod codec;
pub mod ws;
