use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use goalplan_model::{GoalRecord, NewGoal};
use goalplan_utils::error::StoreError;

use crate::{GoalStore, next_goal_id, validate_user_id};

type Key = (String, u64);

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<Key, GoalRecord>,
    next_ids: BTreeMap<String, u64>,
}

/// In-process store with the same semantics as [`crate::FsGoalStore`].
#[derive(Debug, Default)]
pub struct MemoryGoalStore {
    inner: Mutex<Inner>,
}

impl MemoryGoalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(user_id: &str, goal_id: u64) -> StoreError {
    StoreError::NotFound {
        user_id: user_id.to_string(),
        goal_id,
    }
}

impl GoalStore for MemoryGoalStore {
    fn create(
        &self,
        user_id: &str,
        goal: NewGoal,
        now: DateTime<Utc>,
    ) -> Result<GoalRecord, StoreError> {
        validate_user_id(user_id)?;
        let mut inner = self.inner();
        let id = inner.next_ids.get(user_id).copied().unwrap_or(1);
        let following = next_goal_id(user_id, id)?;
        let record = GoalRecord::new(id, user_id, goal, now);
        inner.records.insert((user_id.to_string(), id), record.clone());
        inner.next_ids.insert(user_id.to_string(), following);
        Ok(record)
    }

    fn list(&self, user_id: &str) -> Result<Vec<GoalRecord>, StoreError> {
        validate_user_id(user_id)?;
        Ok(self
            .inner()
            .records
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn get(&self, user_id: &str, goal_id: u64) -> Result<GoalRecord, StoreError> {
        validate_user_id(user_id)?;
        self.inner()
            .records
            .get(&(user_id.to_string(), goal_id))
            .cloned()
            .ok_or_else(|| not_found(user_id, goal_id))
    }

    fn save(&self, record: &GoalRecord) -> Result<(), StoreError> {
        validate_user_id(&record.user_id)?;
        let mut inner = self.inner();
        let slot = inner
            .records
            .get_mut(&(record.user_id.clone(), record.id))
            .ok_or_else(|| not_found(&record.user_id, record.id))?;
        *slot = record.clone();
        Ok(())
    }

    fn delete(&self, user_id: &str, goal_id: u64) -> Result<(), StoreError> {
        validate_user_id(user_id)?;
        self.inner()
            .records
            .remove(&(user_id.to_string(), goal_id))
            .map(|_| ())
            .ok_or_else(|| not_found(user_id, goal_id))
    }
}
