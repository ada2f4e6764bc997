//! Application layer
//!
//! This layer contains use cases that orchestrate domain logic to implement
//! application-specific workflows. Use cases coordinate the gateway client,
//! the persistence port, and tenant configuration to fulfill one request
//! each.

pub mod invoicing;

pub use invoicing::*;
