//! Goal record persistence.
//!
//! Records are scoped by user id. [`FsGoalStore`] keeps one JSON file per
//! goal; [`MemoryGoalStore`] keeps everything in process.

mod fs;
mod memory;

pub use fs::FsGoalStore;
pub use memory::MemoryGoalStore;

use chrono::{DateTime, Utc};
use goalplan_model::{GoalRecord, NewGoal};
use goalplan_utils::error::StoreError;

/// Longest accepted user id.
pub const MAX_USER_ID_LEN: usize = 64;

/// Storage for goal records.
pub trait GoalStore: Send + Sync {
    /// Store a new goal under a fresh id for `user_id`. Ids of deleted goals
    /// are never handed out again.
    fn create(
        &self,
        user_id: &str,
        goal: NewGoal,
        now: DateTime<Utc>,
    ) -> Result<GoalRecord, StoreError>;

    /// All goals of `user_id`, ordered by id.
    fn list(&self, user_id: &str) -> Result<Vec<GoalRecord>, StoreError>;

    fn get(&self, user_id: &str, goal_id: u64) -> Result<GoalRecord, StoreError>;

    /// Overwrite an existing record. Saving a goal that does not exist is
    /// `StoreError::NotFound`.
    fn save(&self, record: &GoalRecord) -> Result<(), StoreError>;

    fn delete(&self, user_id: &str, goal_id: u64) -> Result<(), StoreError>;
}

/// The id after `id`, or an error once the id space is used up.
fn next_goal_id(user_id: &str, id: u64) -> Result<u64, StoreError> {
    id.checked_add(1)
        .ok_or_else(|| StoreError::Write(format!("goal ids for user {user_id} are exhausted")))
}

/// Check that a user id is usable as a single path segment.
///
/// Accepts 1 to [`MAX_USER_ID_LEN`] characters from `[A-Za-z0-9._-]`,
/// excluding `.` and `..`.
pub fn validate_user_id(user_id: &str) -> Result<(), StoreError> {
    let invalid = |reason: &str| StoreError::InvalidUserId {
        user_id: user_id.to_string(),
        reason: reason.to_string(),
    };

    if user_id.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if user_id.len() > MAX_USER_ID_LEN {
        return Err(invalid("is longer than 64 characters"));
    }
    if user_id == "." || user_id == ".." {
        return Err(invalid("is a reserved path name"));
    }
    if !user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(invalid("contains characters other than letters, digits, '.', '_' or '-'"));
    }
    Ok(())
}
