//! In-memory points repository for tests and embedding.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::assignment::domain::{AssignmentId, VolunteerId};
use crate::points::{
    domain::{PointsEntry, PointsEntryId},
    ports::{PointsRepository, PointsRepositoryError, PointsRepositoryResult},
};

/// Thread-safe in-memory points repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPointsRepository {
    state: Arc<RwLock<InMemoryPointsState>>,
}

#[derive(Debug, Default)]
struct InMemoryPointsState {
    entries: HashMap<PointsEntryId, PointsEntry>,
    completion_index: HashSet<AssignmentId>,
}

impl InMemoryPointsRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PointsRepository for InMemoryPointsRepository {
    async fn append(&self, entry: &PointsEntry) -> PointsRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            PointsRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if let Some(assignment_id) = entry.completion_assignment() {
            // The set membership check plus insert happen under one write
            // lock, mirroring the unique-index guarantee of the database.
            if !state.completion_index.insert(assignment_id) {
                return Err(PointsRepositoryError::AlreadyGranted(assignment_id));
            }
        }
        state.entries.insert(entry.id(), entry.clone());
        Ok(())
    }

    async fn find_completion(
        &self,
        assignment_id: AssignmentId,
    ) -> PointsRepositoryResult<Option<PointsEntry>> {
        let state = self.state.read().map_err(|err| {
            PointsRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .entries
            .values()
            .find(|entry| entry.completion_assignment() == Some(assignment_id))
            .cloned())
    }

    async fn list_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> PointsRepositoryResult<Vec<PointsEntry>> {
        let state = self.state.read().map_err(|err| {
            PointsRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut entries: Vec<PointsEntry> = state
            .entries
            .values()
            .filter(|entry| entry.volunteer_id() == volunteer_id)
            .cloned()
            .collect();
        entries.sort_by_key(PointsEntry::created_at);
        Ok(entries)
    }
}
