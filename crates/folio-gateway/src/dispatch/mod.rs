//! Presence event dispatcher and the task that owns it.
//!
//! `EventDispatcher` is the only writer of the presence registry. `runtime`
//! moves it into a single tokio task and exposes a cloneable handle that
//! transport sessions use to feed it events.

pub mod dispatcher;
pub mod runtime;

pub use dispatcher::{EventDispatcher, PresenceStats, RoomNames};
pub use runtime::{spawn, Command, DispatcherHandle};
