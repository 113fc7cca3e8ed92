//! `PostgreSQL` adapters for points persistence.

mod ledger;
mod models;
mod schema;

pub use ledger::{PointsPgPool, PostgresPointsRepository};
