//! Muster: task assignment and notification lifecycle engine.
//!
//! This crate assigns organizational tasks to volunteers, delivers
//! invitation notifications, reconciles accept/reject responses arriving
//! out-of-band (emailed links opened in a different session than the one
//! that received them), ages out unanswered invitations, and awards
//! completion credit exactly once per assignment.
//!
//! # Architecture
//!
//! Muster follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, email, etc.)
//!
//! Every assignment mutation goes through a compare-and-swap on the stored
//! row, which is what lets duplicate clicks, racing responders, and
//! overlapping expiry sweeps resolve first-writer-wins without holding any
//! in-process lock across I/O.
//!
//! # Modules
//!
//! - [`assignment`]: Assignment state machine, response reconciliation,
//!   expiry sweeping, and status projection
//! - [`notify`]: Invitation dispatch, notification records, and response
//!   links
//! - [`points`]: Append-only completion credit ledger
//! - [`config`]: Engine configuration

pub mod assignment;
pub mod config;
pub mod notify;
pub mod points;
