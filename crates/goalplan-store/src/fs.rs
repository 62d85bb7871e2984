use std::io;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use goalplan_model::{GoalRecord, NewGoal};
use goalplan_utils::atomic_write::write_file_atomic;
use goalplan_utils::error::StoreError;
use tracing::debug;

use crate::{GoalStore, next_goal_id, validate_user_id};

/// One JSON file per goal at `<root>/users/<user>/goals/<id>.json`.
///
/// The next id to allocate is kept in `<root>/users/<user>/next_id` so ids
/// of deleted goals are not reused. Writes are atomic. Id allocation
/// assumes a single writer per user.
#[derive(Debug, Clone)]
pub struct FsGoalStore {
    root: Utf8PathBuf,
}

impl FsGoalStore {
    /// # Errors
    ///
    /// Fails when `root` is not valid UTF-8.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        let root = Utf8PathBuf::from_path_buf(root.to_path_buf()).map_err(|path| StoreError::Io {
            source: io::Error::new(io::ErrorKind::InvalidInput, "state directory is not valid UTF-8"),
            path,
        })?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn goals_dir(&self, user_id: &str) -> Result<Utf8PathBuf, StoreError> {
        validate_user_id(user_id)?;
        Ok(self.root.join("users").join(user_id).join("goals"))
    }

    fn next_id_path(&self, user_id: &str) -> Result<Utf8PathBuf, StoreError> {
        validate_user_id(user_id)?;
        Ok(self.root.join("users").join(user_id).join("next_id"))
    }

    /// Stored id counter, `None` before the first goal was created.
    fn read_next_id(&self, user_id: &str) -> Result<Option<u64>, StoreError> {
        let path = self.next_id_path(user_id)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.into_std_path_buf(),
                    source,
                });
            }
        };
        content
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path: path.into_std_path_buf(),
                reason: format!("invalid id counter: {e}"),
            })
    }

    fn record_path(&self, user_id: &str, goal_id: u64) -> Result<Utf8PathBuf, StoreError> {
        Ok(self.goals_dir(user_id)?.join(format!("{goal_id}.json")))
    }

    /// Ids of stored goals, unordered. A missing directory means no goals.
    /// Only canonical names count, so `007.json` is ignored.
    fn goal_ids(&self, user_id: &str) -> Result<Vec<u64>, StoreError> {
        let dir = self.goals_dir(user_id)?;
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: dir.into_std_path_buf(),
                    source,
                });
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.clone().into_std_path_buf(),
                source,
            })?;
            let name = entry.file_name();
            let Some(id) = name
                .to_str()
                .and_then(|n| n.strip_suffix(".json"))
                .and_then(|stem| stem.parse::<u64>().ok().filter(|id| id.to_string() == stem))
            else {
                continue;
            };
            ids.push(id);
        }
        Ok(ids)
    }

    fn read_record(path: &Utf8Path) -> Result<GoalRecord, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf().into_std_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf().into_std_path_buf(),
            reason: e.to_string(),
        })
    }

    fn write_record(path: &Utf8Path, record: &GoalRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StoreError::Write(format!("failed to serialize goal {}: {e}", record.id)))?;
        write_file_atomic(path, &json).map_err(|e| StoreError::Write(format!("{e:#}")))
    }
}

impl GoalStore for FsGoalStore {
    fn create(
        &self,
        user_id: &str,
        goal: NewGoal,
        now: DateTime<Utc>,
    ) -> Result<GoalRecord, StoreError> {
        let highest = self.goal_ids(user_id)?.into_iter().max().unwrap_or(0);
        let after_highest = next_goal_id(user_id, highest)?;
        let id = self
            .read_next_id(user_id)?
            .map_or(after_highest, |next| next.max(after_highest));
        let following = next_goal_id(user_id, id)?;

        let record = GoalRecord::new(id, user_id, goal, now);
        let path = self.record_path(user_id, id)?;
        Self::write_record(&path, &record)?;
        write_file_atomic(&self.next_id_path(user_id)?, &following.to_string())
            .map_err(|e| StoreError::Write(format!("{e:#}")))?;
        debug!(user_id, goal_id = id, path = %path, "created goal record");
        Ok(record)
    }

    fn list(&self, user_id: &str) -> Result<Vec<GoalRecord>, StoreError> {
        let mut ids = self.goal_ids(user_id)?;
        ids.sort_unstable();
        ids.into_iter()
            .map(|id| Self::read_record(&self.record_path(user_id, id)?))
            .collect()
    }

    fn get(&self, user_id: &str, goal_id: u64) -> Result<GoalRecord, StoreError> {
        let path = self.record_path(user_id, goal_id)?;
        if !path.exists() {
            return Err(StoreError::NotFound {
                user_id: user_id.to_string(),
                goal_id,
            });
        }
        Self::read_record(&path)
    }

    fn save(&self, record: &GoalRecord) -> Result<(), StoreError> {
        let path = self.record_path(&record.user_id, record.id)?;
        if !path.exists() {
            return Err(StoreError::NotFound {
                user_id: record.user_id.clone(),
                goal_id: record.id,
            });
        }
        Self::write_record(&path, record)?;
        debug!(user_id = %record.user_id, goal_id = record.id, "saved goal record");
        Ok(())
    }

    fn delete(&self, user_id: &str, goal_id: u64) -> Result<(), StoreError> {
        let path = self.record_path(user_id, goal_id)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(user_id, goal_id, "deleted goal record");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                user_id: user_id.to_string(),
                goal_id,
            }),
            Err(source) => Err(StoreError::Io {
                path: path.into_std_path_buf(),
                source,
            }),
        }
    }
}
