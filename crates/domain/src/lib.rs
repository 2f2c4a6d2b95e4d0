//! # iotbridge-domain
//!
//! Pure domain model for the iotbridge integration runtime.
//!
//! ## Responsibilities
//! - Foundational types: adapter identity, error conventions, exit statuses
//! - Define the **schema** an adapter declares (data and command paths)
//! - Define the **topic grammar** shared with the orchestrator
//! - Define **payloads** (inbound decoding, outbound serialization rule)
//! - Define handler **responses**, **presence** and the **lifecycle** state machine
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod exit;
pub mod identity;
pub mod lifecycle;
pub mod payload;
pub mod presence;
pub mod response;
pub mod schema;
pub mod topic;
