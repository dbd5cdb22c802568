//! Inbound events: closed vocabulary with validated, typed payloads.

use serde_json::Value;

use crate::error::{FolioError, Result};
use crate::ids::{BookId, UserId};

use super::envelope::Envelope;
use super::names;

/// One decoded client event. Connect and disconnect are implicit in the
/// transport and therefore not part of this enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    JoinUserRoom(UserId),
    JoinAdminRoom,
    JoinBookRoom(BookId),
    LeaveBookRoom(BookId),
    /// Client-reported error; logged only.
    Error { detail: String },
}

impl InboundEvent {
    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::JoinUserRoom(_) => names::JOIN_USER_ROOM,
            InboundEvent::JoinAdminRoom => names::JOIN_ADMIN_ROOM,
            InboundEvent::JoinBookRoom(_) => names::JOIN_BOOK_ROOM,
            InboundEvent::LeaveBookRoom(_) => names::LEAVE_BOOK_ROOM,
            InboundEvent::Error { .. } => names::ERROR,
        }
    }

    /// Decode a raw text frame.
    pub fn decode(text: &str) -> Result<Self> {
        let env = Envelope::parse(text)?;
        Self::from_envelope(&env)
    }

    /// Validate an already parsed envelope into a typed event.
    pub fn from_envelope(env: &Envelope) -> Result<Self> {
        let data = match &env.data {
            Some(raw) => Some(
                serde_json::from_str::<Value>(raw.get())
                    .map_err(|e| FolioError::BadRequest(format!("invalid data: {e}")))?,
            ),
            None => None,
        };

        let event = match env.event.as_str() {
            names::JOIN_USER_ROOM => {
                InboundEvent::JoinUserRoom(UserId::parse(&identifier(data.as_ref(), "userId")?)?)
            }
            names::JOIN_ADMIN_ROOM => InboundEvent::JoinAdminRoom,
            names::JOIN_BOOK_ROOM => {
                InboundEvent::JoinBookRoom(BookId::parse(&identifier(data.as_ref(), "bookId")?)?)
            }
            names::LEAVE_BOOK_ROOM => {
                InboundEvent::LeaveBookRoom(BookId::parse(&identifier(data.as_ref(), "bookId")?)?)
            }
            names::ERROR => InboundEvent::Error {
                detail: match data {
                    Some(Value::String(s)) => s,
                    Some(other) => other.to_string(),
                    None => String::new(),
                },
            },
            other => return Err(FolioError::UnknownEvent(other.to_string())),
        };

        tracing::trace!(event = event.name(), "inbound decoded");
        Ok(event)
    }
}

/// Identifiers arrive as a JSON string or an integer id.
fn identifier(data: Option<&Value>, field: &'static str) -> Result<String> {
    match data {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        Some(_) => Err(FolioError::BadRequest(format!("{field} must be a string or integer"))),
        None => Err(FolioError::BadRequest(format!("{field} is required"))),
    }
}
