//! faturalink — merchant back-office core for national e-invoice /
//! e-archive gateway integration.
//!
//! The crate builds UBL-TR invoice documents, wraps them in
//! operation-specific SOAP envelopes, manages per-call gateway sessions,
//! submits documents to the QNB eSolutions sub-services and reconciles
//! their asynchronous status responses into a local document state. The
//! surrounding application (HTTP endpoints, persistence, order sync) plugs
//! in through the ports in [`domain::gateway::ports`].

pub mod application;
pub mod domain;
pub mod infrastructure;
