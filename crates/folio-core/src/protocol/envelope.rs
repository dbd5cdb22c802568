//! JSON envelope shared by inbound and outbound frames.
//!
//! Inbound `data` is kept as `RawValue` and only parsed once the event name
//! tells us what shape to expect.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{FolioError, Result};

use super::PROTOCOL_VERSION;

/// Inbound envelope (text frame).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Protocol version.
    pub v: u8,
    /// Event name, e.g. `joinBookRoom`.
    pub event: String,
    /// Optional payload, stored as raw JSON (lazy parsing). `null` reads as absent.
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

impl Envelope {
    /// Parse a text frame and check the protocol version.
    pub fn parse(text: &str) -> Result<Self> {
        let env: Envelope = serde_json::from_str(text)
            .map_err(|e| FolioError::BadRequest(format!("invalid envelope json: {e}")))?;
        if env.v != PROTOCOL_VERSION {
            return Err(FolioError::UnsupportedVersion);
        }
        Ok(env)
    }
}

/// Outbound envelope; borrowed so broadcasts serialize once.
#[derive(Debug, Serialize)]
pub struct OutEnvelope<'a, T: Serialize> {
    pub v: u8,
    pub event: &'a str,
    pub data: &'a T,
}

impl<'a, T: Serialize> OutEnvelope<'a, T> {
    pub fn new(event: &'a str, data: &'a T) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            event,
            data,
        }
    }
}
