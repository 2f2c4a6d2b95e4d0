//! # iotbridge-app
//!
//! Application layer — the integration runtime and its **port definitions**.
//!
//! ## Responsibilities
//! - Define **port traits** that IO adapters implement:
//!   - `Transport` — the single bus session (connect, subscribe, publish)
//!   - `SchemaStore` — persistence of the computed schema for discovery
//! - Hold the adapter's **route table** (fetchers, command handlers,
//!   out-of-scope listeners) and the **schema registry**
//! - **Dispatch** every inbound message to exactly one handler and publish
//!   the handler's response
//! - Drive the **lifecycle**: subscribe per schema, announce presence,
//!   shut down cleanly on a termination signal
//!
//! ## Dependency rule
//! Depends on `iotbridge-domain` only (plus `tokio` for tasks, channels and
//! timers). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod dispatcher;
pub mod ports;
pub mod presence;
pub mod route_table;
pub mod runtime;
pub mod schema_registry;

#[cfg(test)]
pub(crate) mod testing;
