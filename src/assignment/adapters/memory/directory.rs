//! In-memory directory of tasks and volunteers for tests and embedding.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::assignment::{
    domain::{TaskId, TaskRecord, Volunteer, VolunteerId},
    ports::{DirectoryError, DirectoryResult, OrgDirectory},
};

/// Thread-safe in-memory directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<InMemoryDirectoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryDirectoryState {
    tasks: HashMap<TaskId, TaskRecord>,
    volunteers: HashMap<VolunteerId, Volunteer>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a task record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Lookup`] when the backing store is
    /// poisoned.
    pub fn upsert_task(&self, task: TaskRecord) -> DirectoryResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| DirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        state.tasks.insert(task.id(), task);
        Ok(())
    }

    /// Registers or replaces a volunteer record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Lookup`] when the backing store is
    /// poisoned.
    pub fn upsert_volunteer(&self, volunteer: Volunteer) -> DirectoryResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| DirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        state.volunteers.insert(volunteer.id(), volunteer);
        Ok(())
    }
}

#[async_trait]
impl OrgDirectory for InMemoryDirectory {
    async fn task(&self, id: TaskId) -> DirectoryResult<Option<TaskRecord>> {
        let state = self
            .state
            .read()
            .map_err(|err| DirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn volunteer(&self, id: VolunteerId) -> DirectoryResult<Option<Volunteer>> {
        let state = self
            .state
            .read()
            .map_err(|err| DirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        Ok(state.volunteers.get(&id).cloned())
    }
}
