//! Puzzle sourcing over HTTP.
//!
//! Puzzle files live under `puzzles/YYYY/MM/DD_{difficulty}.json`, with the
//! optimal tour alongside in `DD_{difficulty}_solution.json`. Missing dates
//! fall back to the most recent earlier puzzle within a bounded scan.

use chrono::{Datelike, Days, NaiveDate};
use milkrun_game::provider::{LoadedPuzzle, PuzzleProvider};
use milkrun_game::{Difficulty, Node, Puzzle, PuzzleError};
use serde::Deserialize;
use wasm_bindgen_futures::JsFuture;

use crate::dom;

/// How far back a missing date is allowed to fall.
const FALLBACK_SCAN_DAYS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("puzzle data: {0}")]
    Puzzle(#[from] PuzzleError),
    #[error("solution JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no {difficulty} puzzle available on or before {date}")]
    NoPuzzleAvailable {
        date: NaiveDate,
        difficulty: Difficulty,
    },
    #[error("browser clock unavailable")]
    ClockUnavailable,
}

/// Solution wire file, as written by the daily generator.
#[derive(Debug, Deserialize)]
struct SolutionFile {
    route: Vec<Node>,
}

/// Fetches puzzles and solutions from the site's static asset tree.
#[derive(Debug, Clone)]
pub struct HttpPuzzleProvider {
    base: String,
}

impl Default for HttpPuzzleProvider {
    fn default() -> Self {
        Self::new("puzzles")
    }
}

impl HttpPuzzleProvider {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn puzzle_url(&self, date: NaiveDate, difficulty: Difficulty) -> String {
        format!(
            "{}/{:04}/{:02}/{:02}_{}.json",
            self.base,
            date.year(),
            date.month(),
            date.day(),
            difficulty
        )
    }

    fn solution_url(&self, date: NaiveDate, difficulty: Difficulty) -> String {
        format!(
            "{}/{:04}/{:02}/{:02}_{}_solution.json",
            self.base,
            date.year(),
            date.month(),
            date.day(),
            difficulty
        )
    }

    /// Fetch a URL; `Ok(None)` for a missing resource, `Err` for transport
    /// failures.
    async fn fetch_text(url: &str) -> Result<Option<String>, ProviderError> {
        let response = dom::fetch_response(url)
            .await
            .map_err(|e| ProviderError::Network(dom::js_error_message(&e)))?;
        if !response.ok() {
            return Ok(None);
        }
        let text_promise = response
            .text()
            .map_err(|e| ProviderError::Network(dom::js_error_message(&e)))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|e| ProviderError::Network(dom::js_error_message(&e)))?;
        Ok(text.as_string())
    }

    async fn fetch_puzzle(
        &self,
        date: NaiveDate,
        difficulty: Difficulty,
    ) -> Result<Option<Puzzle>, ProviderError> {
        let url = self.puzzle_url(date, difficulty);
        match Self::fetch_text(&url).await? {
            Some(json) => Ok(Some(Puzzle::from_json(&json)?)),
            None => Ok(None),
        }
    }
}

impl PuzzleProvider for HttpPuzzleProvider {
    type Error = ProviderError;

    async fn load_puzzle(
        &self,
        date: Option<NaiveDate>,
        difficulty: Difficulty,
    ) -> Result<LoadedPuzzle, Self::Error> {
        let start = match date {
            Some(requested) => requested,
            None => dom::today().ok_or(ProviderError::ClockUnavailable)?,
        };
        let mut probe = start;
        for _ in 0..=FALLBACK_SCAN_DAYS {
            if let Some(puzzle) = self.fetch_puzzle(probe, difficulty).await? {
                return Ok(LoadedPuzzle {
                    puzzle,
                    actual_date: probe,
                });
            }
            match probe.checked_sub_days(Days::new(1)) {
                Some(earlier) => probe = earlier,
                None => break,
            }
        }
        Err(ProviderError::NoPuzzleAvailable {
            date: start,
            difficulty,
        })
    }

    async fn load_solution(
        &self,
        date: NaiveDate,
        difficulty: Difficulty,
    ) -> Result<Vec<Node>, Self::Error> {
        let url = self.solution_url(date, difficulty);
        match Self::fetch_text(&url).await? {
            Some(json) => {
                let file: SolutionFile = serde_json::from_str(&json)?;
                Ok(file.route)
            }
            None => Err(ProviderError::NoPuzzleAvailable { date, difficulty }),
        }
    }

    async fn available_days(
        &self,
        year: i32,
        month: u32,
        difficulty: Difficulty,
    ) -> Result<Vec<u32>, Self::Error> {
        let mut days = Vec::new();
        for day in 1..=31 {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                break;
            };
            if self.puzzle_exists(date, difficulty).await {
                days.push(day);
            }
        }
        Ok(days)
    }

    async fn puzzle_exists(&self, date: NaiveDate, difficulty: Difficulty) -> bool {
        let url = self.puzzle_url(date, difficulty);
        matches!(Self::fetch_text(&url).await, Ok(Some(_)))
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_the_generator_layout() {
        let provider = HttpPuzzleProvider::default();
        let date = NaiveDate::from_ymd_opt(2026, 8, 8).unwrap();
        assert_eq!(
            provider.puzzle_url(date, Difficulty::Medium),
            "puzzles/2026/08/08_medium.json"
        );
        assert_eq!(
            provider.solution_url(date, Difficulty::Easy),
            "puzzles/2026/08/08_easy_solution.json"
        );

        let rooted = HttpPuzzleProvider::new("/assets/puzzles");
        assert_eq!(
            rooted.puzzle_url(date, Difficulty::Hard),
            "/assets/puzzles/2026/08/08_hard.json"
        );
    }

    #[test]
    fn solution_wire_file_parses() {
        let json = r#"{
            "date": "2026-08-08",
            "route": [
                {"kind": "depot", "x": 500.0, "y": 500.0},
                {"kind": "stop", "id": 1, "x": 100.0, "y": 100.0},
                {"kind": "depot", "x": 500.0, "y": 500.0}
            ],
            "optimal_distance": 1131.37
        }"#;
        let file: SolutionFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.route.len(), 3);
        assert!(file.route[0].is_depot());
    }
}
