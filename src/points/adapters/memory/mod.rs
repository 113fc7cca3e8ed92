//! In-memory adapters for the points context.

mod ledger;

pub use ledger::InMemoryPointsRepository;
