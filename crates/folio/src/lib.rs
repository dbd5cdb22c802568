//! Top-level facade crate for folio.
//!
//! Re-exports the wire contracts and the presence gateway so users can depend on a single crate.

pub mod core {
    pub use folio_core::*;
}

pub mod gateway {
    pub use folio_gateway::*;
}
