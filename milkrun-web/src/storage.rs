//! Score persistence over `localStorage`.

use chrono::NaiveDate;
use milkrun_game::score::ScoreRecord;
use milkrun_game::store::{ScoreStore, Statistics, better_of};
use milkrun_game::Difficulty;

use crate::dom;

const SCORES_KEY: &str = "milkrun.scores.v1";
/// History cap; oldest records are evicted first.
const MAX_RECORDS: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Append-only record history under a single versioned key.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageScoreStore;

impl LocalStorageScoreStore {
    fn read_all() -> Result<Vec<ScoreRecord>, StoreError> {
        let storage = dom::local_storage()
            .map_err(|e| StoreError::Storage(dom::js_error_message(&e)))?;
        let raw = storage
            .get_item(SCORES_KEY)
            .map_err(|e| StoreError::Storage(dom::js_error_message(&e)))?;
        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_all(records: &[ScoreRecord]) -> Result<(), StoreError> {
        let storage = dom::local_storage()
            .map_err(|e| StoreError::Storage(dom::js_error_message(&e)))?;
        let json = serde_json::to_string(records)?;
        storage
            .set_item(SCORES_KEY, &json)
            .map_err(|e| StoreError::Storage(dom::js_error_message(&e)))
    }
}

impl ScoreStore for LocalStorageScoreStore {
    type Error = StoreError;

    fn save_score(&self, record: &ScoreRecord) -> Result<(), Self::Error> {
        let mut records = Self::read_all()?;
        records.push(record.clone());
        if records.len() > MAX_RECORDS {
            let excess = records.len() - MAX_RECORDS;
            records.drain(..excess);
        }
        Self::write_all(&records)
    }

    fn best_score(
        &self,
        date: NaiveDate,
        difficulty: Difficulty,
    ) -> Result<Option<ScoreRecord>, Self::Error> {
        let records = Self::read_all()?;
        Ok(records
            .iter()
            .filter(|r| r.date == date && r.difficulty == difficulty)
            .fold(None, |best: Option<&ScoreRecord>, record| {
                Some(best.map_or(record, |b| better_of(b, record)))
            })
            .cloned())
    }

    fn recent_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, Self::Error> {
        let records = Self::read_all()?;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    fn statistics(&self) -> Result<Statistics, Self::Error> {
        let records = Self::read_all()?;
        Ok(Statistics::from_records(records.iter()))
    }
}
