//! One puzzle bound to live game state.
//!
//! Constructing a [`GameSession`] is the atomic puzzle swap: route, visited
//! set, attempt bookkeeping, playback, and reminder state are born together,
//! so a half-updated puzzle/route pairing is never observable.

use std::collections::HashSet;

use crate::geometry::Point;
use crate::playback::SolutionPlayback;
use crate::puzzle::{Difficulty, Node, Puzzle};
use crate::route::{Intent, RouteState};
use crate::score::{Completion, WinCheck, confirm_win};

/// What one intent did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Illegal or irrelevant intent; nothing changed.
    Rejected,
    /// State changed without finishing the tour.
    Mutated,
    /// The tour closed and validated; the caller should stamp a timestamp
    /// and persist a score record.
    Completed(Completion),
}

/// Read-only state for the renderer. Produced fresh each draw; feeds
/// nothing back.
#[derive(Debug, Clone, Copy)]
pub struct RenderSnapshot<'a> {
    pub puzzle: &'a Puzzle,
    pub route: &'a [Node],
    pub visited: &'a HashSet<u32>,
    pub game_complete: bool,
    pub return_reminder: bool,
    pub attempts: u32,
    pub solution: Option<SolutionView<'a>>,
}

/// Revealed slice of the optimal tour.
#[derive(Debug, Clone, Copy)]
pub struct SolutionView<'a> {
    pub route: &'a [Node],
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    puzzle: Puzzle,
    difficulty: Difficulty,
    route: RouteState,
    playback: SolutionPlayback,
    attempts: u32,
    revision: u64,
    reminder: bool,
}

impl GameSession {
    #[must_use]
    pub fn new(puzzle: Puzzle, difficulty: Difficulty) -> Self {
        Self {
            puzzle,
            difficulty,
            route: RouteState::new(),
            playback: SolutionPlayback::default(),
            attempts: 0,
            revision: 0,
            reminder: false,
        }
    }

    #[must_use]
    pub const fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub const fn route(&self) -> &RouteState {
        &self.route
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Monotonic counter bumped on every effective mutation. Delayed
    /// callbacks capture it to detect staleness.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Process one intent to completion: route mutation, then the win/score
    /// evaluator, then bookkeeping. Intents are never interleaved.
    pub fn apply(&mut self, intent: &Intent) -> SessionEvent {
        if !self.route.apply(intent, &self.puzzle).mutated() {
            return SessionEvent::Rejected;
        }
        self.revision += 1;
        self.reminder = false;
        match confirm_win(&self.route, &self.puzzle) {
            WinCheck::NotYet | WinCheck::Invalid => SessionEvent::Mutated,
            WinCheck::Confirmed { distance } => {
                if self.route.attempt_started() {
                    self.attempts += 1;
                    self.route.clear_attempt_started();
                }
                self.route.mark_complete();
                SessionEvent::Completed(Completion::new(
                    self.puzzle.optimal_distance,
                    distance,
                    self.attempts,
                ))
            }
        }
    }

    /// Whether a "return to depot" reminder makes sense right now: every
    /// stop visited, tour not yet closed, game not complete.
    #[must_use]
    pub fn reminder_eligible(&self) -> bool {
        !self.route.is_complete()
            && self.route.visited().len() == self.puzzle.stop_count()
            && self.route.tail().is_some_and(|tail| !tail.is_depot())
    }

    /// Fire a reminder armed at `armed_revision`. Raises the flag only when
    /// no mutation intervened and the reminder is still warranted; a stale
    /// revision is silently dropped.
    pub fn fire_reminder(&mut self, armed_revision: u64) -> bool {
        if armed_revision == self.revision && self.reminder_eligible() {
            self.reminder = true;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub const fn reminder_raised(&self) -> bool {
        self.reminder
    }

    /// Whether this tier permits revealing the optimal tour.
    #[must_use]
    pub const fn solution_available(&self) -> bool {
        self.difficulty.solution_available()
    }

    /// Begin solution playback. Refused (returning `false`) on tiers where
    /// the solution is withheld.
    pub fn start_solution(&mut self, route: Vec<Node>) -> bool {
        if !self.solution_available() {
            return false;
        }
        self.playback.start(route);
        true
    }

    pub fn stop_solution(&mut self) {
        self.playback.stop();
    }

    /// Advance playback one edge; `false` means the driving timer should
    /// be cancelled.
    pub fn step_solution(&mut self) -> bool {
        self.playback.step()
    }

    #[must_use]
    pub const fn showing_solution(&self) -> bool {
        self.playback.is_active()
    }

    #[must_use]
    pub fn snapshot(&self) -> RenderSnapshot<'_> {
        RenderSnapshot {
            puzzle: &self.puzzle,
            route: self.route.route(),
            visited: self.route.visited(),
            game_complete: self.route.is_complete(),
            return_reminder: self.reminder,
            attempts: self.attempts,
            solution: self.playback.route().map(|route| SolutionView {
                route,
                index: self.playback.index(),
            }),
        }
    }

    /// Convenience for hit-testing against this session's board.
    #[must_use]
    pub fn node_at(&self, point: Point, radius: f64) -> Option<Node> {
        self.puzzle.node_at(point, radius)
    }
}
