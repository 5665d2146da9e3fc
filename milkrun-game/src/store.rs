//! Score persistence contract and derived statistics.
//!
//! The core emits records on completion and never reads them back to make
//! gameplay decisions; everything here is informational.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::puzzle::Difficulty;
use crate::score::ScoreRecord;

/// Persists completion records and serves derived views.
pub trait ScoreStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Append one completion record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    fn save_score(&self, record: &ScoreRecord) -> Result<(), Self::Error>;

    /// Best recorded outcome for one puzzle and tier.
    ///
    /// # Errors
    ///
    /// Returns an error if stored records cannot be read.
    fn best_score(
        &self,
        date: NaiveDate,
        difficulty: Difficulty,
    ) -> Result<Option<ScoreRecord>, Self::Error>;

    /// Most recent records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if stored records cannot be read.
    fn recent_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, Self::Error>;

    /// Aggregate statistics over all stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if stored records cannot be read.
    fn statistics(&self) -> Result<Statistics, Self::Error>;
}

/// Aggregates derived from the record history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    /// Completion records stored.
    pub games_played: u32,
    /// Distinct (date, difficulty) puzzles with at least one completion.
    pub puzzles_solved: u32,
    pub total_attempts: u32,
    pub best_efficiency: f64,
    pub average_efficiency: f64,
}

impl Statistics {
    /// Pure fold shared by every store implementation.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ScoreRecord>) -> Self {
        let mut stats = Self::default();
        let mut efficiency_sum = 0.0;
        let mut puzzles = std::collections::HashSet::new();
        for record in records {
            stats.games_played += 1;
            stats.total_attempts += record.attempts;
            efficiency_sum += record.efficiency;
            stats.best_efficiency = stats.best_efficiency.max(record.efficiency);
            puzzles.insert((record.date, record.difficulty));
        }
        stats.puzzles_solved = u32::try_from(puzzles.len()).unwrap_or(u32::MAX);
        if stats.games_played > 0 {
            efficiency_sum /= f64::from(stats.games_played);
            stats.average_efficiency = efficiency_sum;
        }
        stats
    }
}

/// The better of two records for the same puzzle: higher efficiency, then
/// shorter tour, then the earlier achievement.
#[must_use]
pub fn better_of<'a>(a: &'a ScoreRecord, b: &'a ScoreRecord) -> &'a ScoreRecord {
    if b.efficiency > a.efficiency
        || (b.efficiency == a.efficiency && b.distance < a.distance)
    {
        b
    } else {
        a
    }
}

/// Shared-memory store for tests and native harnesses.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    records: Rc<RefCell<Vec<ScoreRecord>>>,
}

impl MemoryScoreStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<ScoreRecord> {
        self.records.borrow().clone()
    }
}

impl ScoreStore for MemoryScoreStore {
    type Error = Infallible;

    fn save_score(&self, record: &ScoreRecord) -> Result<(), Self::Error> {
        self.records.borrow_mut().push(record.clone());
        Ok(())
    }

    fn best_score(
        &self,
        date: NaiveDate,
        difficulty: Difficulty,
    ) -> Result<Option<ScoreRecord>, Self::Error> {
        let records = self.records.borrow();
        Ok(records
            .iter()
            .filter(|r| r.date == date && r.difficulty == difficulty)
            .fold(None, |best: Option<&ScoreRecord>, record| {
                Some(best.map_or(record, |b| better_of(b, record)))
            })
            .cloned())
    }

    fn recent_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, Self::Error> {
        let records = self.records.borrow();
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    fn statistics(&self) -> Result<Statistics, Self::Error> {
        Ok(Statistics::from_records(self.records.borrow().iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, difficulty: Difficulty, efficiency: f64, attempts: u32) -> ScoreRecord {
        ScoreRecord {
            date: NaiveDate::from_ymd_opt(2026, 8, day).unwrap(),
            difficulty,
            distance: 4000.0 * 100.0 / efficiency,
            optimal_distance: 4000.0,
            efficiency,
            attempts,
            timestamp_ms: i64::from(day) * 1_000,
        }
    }

    #[test]
    fn statistics_fold_aggregates() {
        let records = [
            record(1, Difficulty::Easy, 80.0, 1),
            record(1, Difficulty::Easy, 90.0, 2),
            record(2, Difficulty::Hard, 100.0, 1),
        ];
        let stats = Statistics::from_records(records.iter());
        assert_eq!(stats.games_played, 3);
        assert_eq!(stats.puzzles_solved, 2);
        assert_eq!(stats.total_attempts, 4);
        assert!((stats.best_efficiency - 100.0).abs() < f64::EPSILON);
        assert!((stats.average_efficiency - 90.0).abs() < 1e-9);
    }

    #[test]
    fn empty_history_is_all_zeroes() {
        let stats = Statistics::from_records([]);
        assert_eq!(stats, Statistics::default());
    }

    #[test]
    fn best_score_prefers_efficiency_then_distance() {
        let store = MemoryScoreStore::new();
        store.save_score(&record(1, Difficulty::Easy, 80.0, 1)).unwrap();
        store.save_score(&record(1, Difficulty::Easy, 95.0, 2)).unwrap();
        store.save_score(&record(1, Difficulty::Easy, 95.0, 3)).unwrap();
        let best = store
            .best_score(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(), Difficulty::Easy)
            .unwrap()
            .unwrap();
        assert!((best.efficiency - 95.0).abs() < f64::EPSILON);
        assert_eq!(best.attempts, 2);

        assert!(
            store
                .best_score(NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(), Difficulty::Easy)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn recent_scores_are_newest_first() {
        let store = MemoryScoreStore::new();
        for day in 1..=4 {
            store.save_score(&record(day, Difficulty::Medium, 90.0, 1)).unwrap();
        }
        let recent = store.recent_scores(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, NaiveDate::from_ymd_opt(2026, 8, 4).unwrap());
        assert_eq!(recent[1].date, NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
    }
}
