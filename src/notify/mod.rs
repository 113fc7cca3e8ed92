//! Notification delivery for task assignments.
//!
//! This context turns a `pending` assignment into an outbound invitation
//! (email plus in-app record) with embedded accept/reject links, keeps a
//! durable log of every delivery, and informs organizers of responses.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
