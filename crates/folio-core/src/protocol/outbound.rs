//! Outbound events sent to admin observers.

use serde::Serialize;

use crate::error::{FolioError, Result};

use super::envelope::OutEnvelope;
use super::names;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundEvent {
    /// Broadcast to every admin observer when the count may have changed.
    OnlineUsersUpdate { count: usize },
    /// Unicast to a connection right after it joins the admin room.
    CurrentStats { online_users: usize },
}

#[derive(Debug, Serialize)]
struct StatsPayload {
    #[serde(rename = "onlineUsers")]
    online_users: usize,
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::OnlineUsersUpdate { .. } => names::ONLINE_USERS_UPDATE,
            OutboundEvent::CurrentStats { .. } => names::CURRENT_STATS,
        }
    }

    /// Encode to the JSON text sent over the wire.
    pub fn encode(&self) -> Result<String> {
        let encoded = match *self {
            OutboundEvent::OnlineUsersUpdate { count } => {
                serde_json::to_string(&OutEnvelope::new(self.name(), &count))
            }
            OutboundEvent::CurrentStats { online_users } => serde_json::to_string(
                &OutEnvelope::new(self.name(), &StatsPayload { online_users }),
            ),
        };
        encoded.map_err(|e| FolioError::Internal(format!("json encode failed: {e}")))
    }
}
