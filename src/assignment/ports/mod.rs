//! Port contracts for the assignment context.

mod directory;
mod events;
pub mod repository;

pub use directory::{DirectoryError, DirectoryResult, OrgDirectory};
pub use events::EventPublisher;
pub use repository::{AssignmentRepository, AssignmentRepositoryError, AssignmentRepositoryResult};
