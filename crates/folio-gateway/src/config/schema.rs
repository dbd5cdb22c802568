use serde::Deserialize;
use folio_core::error::{FolioError, Result};

use crate::dispatch::RoomNames;
use crate::presence::CountPolicy;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub presence: PresenceSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            presence: PresenceSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(FolioError::UnsupportedVersion);
        }
        self.gateway.validate()?;
        self.presence.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Per-connection outbound queue depth.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    /// How long shutdown waits for open sessions to close.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            outbound_queue: default_outbound_queue(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(FolioError::BadRequest(
                "gateway.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(FolioError::BadRequest(
                "gateway.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(FolioError::BadRequest(
                "gateway.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if !(1..=65536).contains(&self.outbound_queue) {
            return Err(FolioError::BadRequest(
                "gateway.outbound_queue must be between 1 and 65536".into(),
            ));
        }
        if self.shutdown_grace_ms > 300000 {
            return Err(FolioError::BadRequest(
                "gateway.shutdown_grace_ms must be at most 300000".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_outbound_queue() -> usize {
    256
}
fn default_shutdown_grace_ms() -> u64 {
    10000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresenceSection {
    #[serde(default = "default_admin_room")]
    pub admin_room: String,

    #[serde(default = "default_user_room_prefix")]
    pub user_room_prefix: String,

    #[serde(default = "default_book_room_prefix")]
    pub book_room_prefix: String,

    /// Dispatcher command channel depth.
    #[serde(default = "default_command_queue")]
    pub command_queue: usize,

    /// Count dashboard sessions that are not also identified users.
    #[serde(default = "default_count_admin_observers")]
    pub count_admin_observers: bool,
}

impl Default for PresenceSection {
    fn default() -> Self {
        Self {
            admin_room: default_admin_room(),
            user_room_prefix: default_user_room_prefix(),
            book_room_prefix: default_book_room_prefix(),
            command_queue: default_command_queue(),
            count_admin_observers: default_count_admin_observers(),
        }
    }
}

impl PresenceSection {
    pub fn validate(&self) -> Result<()> {
        if self.admin_room.trim().is_empty() {
            return Err(FolioError::BadRequest("presence.admin_room must not be empty".into()));
        }
        let user = self.user_room_prefix.as_str();
        let book = self.book_room_prefix.as_str();
        if user.is_empty() || book.is_empty() {
            return Err(FolioError::BadRequest(
                "presence.user_room_prefix and book_room_prefix must not be empty".into(),
            ));
        }
        // Substrate room names share one namespace; no name may be reachable
        // from two registry keys.
        if user.starts_with(book) || book.starts_with(user) {
            return Err(FolioError::BadRequest(
                "presence.user_room_prefix and book_room_prefix must not prefix each other".into(),
            ));
        }
        if self.admin_room.starts_with(user) || self.admin_room.starts_with(book) {
            return Err(FolioError::BadRequest(
                "presence.admin_room must not start with a room prefix".into(),
            ));
        }
        if !(1..=1_000_000).contains(&self.command_queue) {
            return Err(FolioError::BadRequest(
                "presence.command_queue must be between 1 and 1000000".into(),
            ));
        }
        Ok(())
    }

    pub fn count_policy(&self) -> CountPolicy {
        if self.count_admin_observers {
            CountPolicy::UsersAndAdminSessions
        } else {
            CountPolicy::UsersOnly
        }
    }

    pub fn room_names(&self) -> RoomNames {
        RoomNames::new(
            self.admin_room.clone(),
            self.user_room_prefix.clone(),
            self.book_room_prefix.clone(),
        )
    }
}

fn default_admin_room() -> String {
    "admin".into()
}
fn default_user_room_prefix() -> String {
    "user:".into()
}
fn default_book_room_prefix() -> String {
    "book:".into()
}
fn default_command_queue() -> usize {
    1024
}
fn default_count_admin_observers() -> bool {
    true
}
