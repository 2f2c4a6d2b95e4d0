//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the runtime core and the outside world.
//! They are defined here (in `app`) so that both the runtime and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod schema_store;
pub mod transport;

pub use schema_store::SchemaStore;
pub use transport::{SessionEvent, Transport};
