//! Application services for the points context.

mod ledger;

pub use ledger::{GrantError, GrantResult, PointsLedger};
