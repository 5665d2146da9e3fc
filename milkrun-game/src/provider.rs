//! Puzzle sourcing contract.
//!
//! Implementations own file layout, transport, and fallback policy; the
//! core only requires that a load atomically yields a whole puzzle plus the
//! date it actually came from.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::puzzle::{Difficulty, Node, Puzzle};

/// A loaded puzzle together with the date the provider actually served.
/// Providers may substitute the most recent available date; callers must
/// reset route state when `actual_date` differs from the request.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPuzzle {
    pub puzzle: Puzzle,
    pub actual_date: NaiveDate,
}

/// Supplies puzzles and precomputed solutions for a date and tier.
// Async without a Send bound: consumers are single-threaded wasm or local
// test executors.
#[allow(async_fn_in_trait)]
pub trait PuzzleProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the puzzle for `date` (or the latest available when `None`).
    ///
    /// # Errors
    ///
    /// Returns an error when no puzzle can be served at all.
    async fn load_puzzle(
        &self,
        date: Option<NaiveDate>,
        difficulty: Difficulty,
    ) -> Result<LoadedPuzzle, Self::Error>;

    /// Load the precomputed optimal tour for an exact date.
    ///
    /// # Errors
    ///
    /// Returns an error when the solution file is missing or malformed.
    async fn load_solution(
        &self,
        date: NaiveDate,
        difficulty: Difficulty,
    ) -> Result<Vec<Node>, Self::Error>;

    /// Days of the given month that have a puzzle published.
    ///
    /// # Errors
    ///
    /// Returns an error when discovery cannot be performed.
    async fn available_days(
        &self,
        year: i32,
        month: u32,
        difficulty: Difficulty,
    ) -> Result<Vec<u32>, Self::Error>;

    /// Whether a puzzle exists for the exact date.
    async fn puzzle_exists(&self, date: NaiveDate, difficulty: Difficulty) -> bool;
}

/// Errors from the in-memory provider.
#[derive(Debug, thiserror::Error)]
pub enum MemoryProviderError {
    #[error("no puzzle available on or before {0}")]
    NoPuzzle(NaiveDate),
    #[error("no solution recorded for {0}")]
    NoSolution(NaiveDate),
}

/// Map-backed provider for tests and native harnesses. Falls back to the
/// most recent earlier date, mirroring the production contract.
#[derive(Debug, Clone, Default)]
pub struct MemoryPuzzleProvider {
    puzzles: BTreeMap<(Difficulty, NaiveDate), Puzzle>,
    solutions: BTreeMap<(Difficulty, NaiveDate), Vec<Node>>,
}

impl MemoryPuzzleProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_puzzle(&mut self, difficulty: Difficulty, puzzle: Puzzle) {
        self.puzzles.insert((difficulty, puzzle.date), puzzle);
    }

    pub fn insert_solution(
        &mut self,
        difficulty: Difficulty,
        date: NaiveDate,
        route: Vec<Node>,
    ) {
        self.solutions.insert((difficulty, date), route);
    }

    fn latest_on_or_before(
        &self,
        date: Option<NaiveDate>,
        difficulty: Difficulty,
    ) -> Option<&Puzzle> {
        self.puzzles
            .range((difficulty, NaiveDate::MIN)..=(difficulty, date.unwrap_or(NaiveDate::MAX)))
            .next_back()
            .map(|(_, puzzle)| puzzle)
    }
}

impl PuzzleProvider for MemoryPuzzleProvider {
    type Error = MemoryProviderError;

    async fn load_puzzle(
        &self,
        date: Option<NaiveDate>,
        difficulty: Difficulty,
    ) -> Result<LoadedPuzzle, Self::Error> {
        self.latest_on_or_before(date, difficulty)
            .map(|puzzle| LoadedPuzzle {
                puzzle: puzzle.clone(),
                actual_date: puzzle.date,
            })
            .ok_or_else(|| MemoryProviderError::NoPuzzle(date.unwrap_or(NaiveDate::MAX)))
    }

    async fn load_solution(
        &self,
        date: NaiveDate,
        difficulty: Difficulty,
    ) -> Result<Vec<Node>, Self::Error> {
        self.solutions
            .get(&(difficulty, date))
            .cloned()
            .ok_or(MemoryProviderError::NoSolution(date))
    }

    async fn available_days(
        &self,
        year: i32,
        month: u32,
        difficulty: Difficulty,
    ) -> Result<Vec<u32>, Self::Error> {
        use chrono::Datelike;
        Ok(self
            .puzzles
            .keys()
            .filter(|(d, date)| *d == difficulty && date.year() == year && date.month() == month)
            .map(|(_, date)| date.day())
            .collect())
    }

    async fn puzzle_exists(&self, date: NaiveDate, difficulty: Difficulty) -> bool {
        self.puzzles.contains_key(&(difficulty, date))
    }
}
