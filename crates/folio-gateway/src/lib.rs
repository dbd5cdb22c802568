//! folio presence gateway library entry.
//!
//! Tracks which reader-app and dashboard connections are online, which rooms
//! (user notification channel, book discussion channel, admin channel) each
//! one occupies, and broadcasts the online user count to admin observers.
//! Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod obs;
pub mod ops;
pub mod presence;
pub mod realtime;
pub mod router;
pub mod transport;
