//! Milkrun Game Engine
//!
//! Platform-agnostic core logic for Milkrun, a daily closed-tour routing
//! puzzle. This crate provides the route state machine, scoring, gesture
//! decoding, and solution playback without UI or platform-specific
//! dependencies.

pub mod geometry;
pub mod gesture;
pub mod playback;
pub mod provider;
pub mod puzzle;
pub mod route;
pub mod score;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use geometry::{Point, distance, path_length};
pub use gesture::{GestureDecoder, POINTER_HIT_RADIUS, TOUCH_HIT_RADIUS};
pub use playback::SolutionPlayback;
pub use provider::{LoadedPuzzle, MemoryPuzzleProvider, PuzzleProvider};
pub use puzzle::{BOARD_SIZE, Difficulty, Node, NodeKey, Puzzle, PuzzleError, Stop};
pub use route::{Applied, Intent, RouteState};
pub use score::{Completion, ScoreRecord, WinCheck, confirm_win, efficiency};
pub use session::{GameSession, RenderSnapshot, SessionEvent, SolutionView};
pub use store::{MemoryScoreStore, ScoreStore, Statistics, better_of};

use chrono::NaiveDate;

/// A freshly started session plus where its puzzle actually came from.
#[derive(Debug)]
pub struct SessionStart {
    pub session: GameSession,
    pub actual_date: NaiveDate,
    /// True when the provider served a different date than requested; the
    /// caller should surface the substitution to any date display.
    pub substituted: bool,
}

/// Binds a puzzle provider and a score store into one game front door.
pub struct GameEngine<P, S>
where
    P: PuzzleProvider,
    S: ScoreStore,
{
    provider: P,
    store: S,
}

impl<P, S> GameEngine<P, S>
where
    P: PuzzleProvider,
    S: ScoreStore,
{
    /// Create a new engine with the provided puzzle source and score store.
    pub const fn new(provider: P, store: S) -> Self {
        Self { provider, store }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Load a puzzle and start a fresh session for it. The swap is atomic:
    /// the new session carries no state from any previous puzzle.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider cannot serve any puzzle.
    pub async fn start_session(
        &self,
        date: Option<NaiveDate>,
        difficulty: Difficulty,
    ) -> Result<SessionStart, P::Error> {
        let loaded = self.provider.load_puzzle(date, difficulty).await?;
        let substituted = date.is_some_and(|requested| requested != loaded.actual_date);
        Ok(SessionStart {
            actual_date: loaded.actual_date,
            substituted,
            session: GameSession::new(loaded.puzzle, difficulty),
        })
    }

    /// Load a puzzle, start a session, and look up the stored best for it
    /// in one step.
    ///
    /// # Errors
    ///
    /// Returns an error when either the provider or the store fails.
    pub async fn start_session_with_best(
        &self,
        date: Option<NaiveDate>,
        difficulty: Difficulty,
    ) -> Result<(SessionStart, Option<ScoreRecord>), anyhow::Error>
    where
        P::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let start = self
            .start_session(date, difficulty)
            .await
            .map_err(Into::into)?;
        let best = self
            .store
            .best_score(start.actual_date, difficulty)
            .map_err(Into::into)?;
        Ok((start, best))
    }

    /// Stamp and persist a completion, returning the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot persist the record.
    pub fn record_completion(
        &self,
        session: &GameSession,
        completion: &Completion,
        timestamp_ms: i64,
    ) -> Result<ScoreRecord, S::Error> {
        let record = ScoreRecord::new(
            session.puzzle().date,
            session.difficulty(),
            completion,
            timestamp_ms,
        );
        self.store.save_score(&record)?;
        Ok(record)
    }

    /// Fetch the optimal tour and start playback. `Ok(false)` means the
    /// session's tier withholds solutions and nothing was fetched.
    ///
    /// # Errors
    ///
    /// Returns an error when the solution cannot be loaded.
    pub async fn reveal_solution(&self, session: &mut GameSession) -> Result<bool, P::Error> {
        if !session.solution_available() {
            return Ok(false);
        }
        let route = self
            .provider
            .load_solution(session.puzzle().date, session.difficulty())
            .await?;
        Ok(session.start_solution(route))
    }
}
