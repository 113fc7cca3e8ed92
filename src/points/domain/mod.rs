//! Domain model for completion credit.

mod entry;

pub use entry::{PersistedPointsData, PointsEntry, PointsEntryId, PointsSource};
