//! Adapter implementations for the assignment context.

mod broadcast;
pub mod memory;
pub mod postgres;

pub use broadcast::BroadcastEventPublisher;
