//! folio core: wire contracts, typed identifiers, and the shared error type.
//!
//! This crate defines the inbound/outbound event vocabulary spoken between
//! reader apps, the admin dashboard and the presence gateway. It carries no
//! transport or runtime dependencies so the same contracts can be reused by
//! the gateway, its tests, and client tooling.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed input
//! always surfaces as `FolioError` so a hostile client cannot crash the
//! process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod ids;
pub mod protocol;

/// Shared result type.
pub use error::{Result, FolioError};
pub use ids::{BookId, ConnectionId, UserId};
