//! Typed identifiers.
//!
//! `UserId` and `BookId` can only be built through `parse`, which rejects
//! empty and whitespace-only input. Anything holding one of these has already
//! passed boundary validation.

use std::fmt;

use serde::Serialize;

use crate::error::{FolioError, Result};

/// Opaque per-connection id assigned by the transport at connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Validate and build from raw client input (trimmed, non-empty).
            pub fn parse(raw: &str) -> Result<Self> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(FolioError::BadRequest(concat!($what, " must not be empty").into()));
                }
                Ok(Self(trimmed.to_owned()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = FolioError;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }
    };
}

string_id!(
    /// Authenticated app user identifier (trusted as supplied by the client).
    UserId,
    "userId"
);

string_id!(
    /// Book identifier naming a discussion channel.
    BookId,
    "bookId"
);
