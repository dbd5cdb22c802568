//! Frame classification for the transport layer.
//!
//! - Text frames carry event envelopes and are decoded by the dispatcher
//! - Binary frames are not part of the protocol
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;

#[derive(Debug, PartialEq, Eq)]
pub enum Inbound {
    Event(String),
    Unsupported { bytes_len: usize },
    Ping(Vec<u8>),
    Pong,
    Close,
}

pub fn classify(msg: Message) -> Inbound {
    match msg {
        Message::Text(s) => Inbound::Event(s),
        Message::Binary(b) => Inbound::Unsupported { bytes_len: b.len() },
        Message::Ping(v) => Inbound::Ping(v),
        Message::Pong(_) => Inbound::Pong,
        Message::Close(_) => Inbound::Close,
    }
}
