//! Port contracts for the points context.

mod repository;

pub use repository::{PointsRepository, PointsRepositoryError, PointsRepositoryResult};
