//! Adapter implementations for the notification context.

pub mod memory;
pub mod postgres;
mod ses;

pub use ses::SesChannel;
