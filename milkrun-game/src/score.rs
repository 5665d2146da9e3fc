//! Completion checks and scoring for closed tours.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::puzzle::{Difficulty, Node, Puzzle};
use crate::route::RouteState;

/// Result of re-checking a route after a mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WinCheck {
    /// The tour is not closed over every stop yet.
    NotYet,
    /// The cheap win gate passed but the structural re-validation did not;
    /// the completion is aborted and the route stays open.
    Invalid,
    /// A confirmed win, with the closed tour's distance.
    Confirmed { distance: f64 },
}

/// Win gate plus independent structural re-validation.
///
/// The state machine already guarantees a well-formed route; the structural
/// pass re-derives the visited multiset from the route itself so a state
/// machine bug cannot smuggle an invalid tour into a completion.
#[must_use]
pub fn confirm_win(state: &RouteState, puzzle: &Puzzle) -> WinCheck {
    let route = state.route();
    let closed_tour = route.len() >= 2
        && route.first().is_some_and(Node::is_depot)
        && route.last().is_some_and(Node::is_depot)
        && state.visited().len() == puzzle.stop_count();
    if !closed_tour {
        return WinCheck::NotYet;
    }
    if !structurally_valid(route, puzzle) {
        log::warn!(
            "closed tour failed structural validation on {}; completion aborted",
            puzzle.date
        );
        return WinCheck::Invalid;
    }
    WinCheck::Confirmed {
        distance: state.current_distance(),
    }
}

fn structurally_valid(route: &[Node], puzzle: &Puzzle) -> bool {
    let mut seen = HashSet::with_capacity(puzzle.stop_count());
    for node in route {
        if let Some(id) = node.stop_id()
            && !seen.insert(id)
        {
            return false;
        }
    }
    seen == puzzle.stop_ids()
}

/// Percentage efficiency of a closed tour against the stored optimum,
/// capped at 100.
#[must_use]
pub fn efficiency(optimal_distance: f64, current_distance: f64) -> f64 {
    (optimal_distance / current_distance).min(1.0) * 100.0
}

/// Outcome of a confirmed completion, before the caller stamps a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub distance: f64,
    /// The stored optimum, or the player's distance when they beat it. The
    /// puzzle's own optimum is never rewritten.
    pub optimal_distance: f64,
    pub efficiency: f64,
    pub attempts: u32,
    pub beat_stored_optimum: bool,
}

impl Completion {
    /// Assemble the scoring outcome for a confirmed win.
    #[must_use]
    pub fn new(puzzle_optimal: f64, distance: f64, attempts: u32) -> Self {
        let beat_stored_optimum = distance < puzzle_optimal;
        if beat_stored_optimum {
            // The precomputed optimum was a heuristic upper bound after all.
            log::info!(
                "player tour {distance:.2} beats stored optimum {puzzle_optimal:.2}"
            );
        }
        Self {
            distance,
            optimal_distance: if beat_stored_optimum {
                distance
            } else {
                puzzle_optimal
            },
            efficiency: efficiency(puzzle_optimal, distance),
            attempts: attempts.max(1),
            beat_stored_optimum,
        }
    }
}

/// One persisted attempt outcome. Records are append-only; "best" views are
/// derived by the score store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub date: NaiveDate,
    pub difficulty: Difficulty,
    pub distance: f64,
    pub optimal_distance: f64,
    pub efficiency: f64,
    pub attempts: u32,
    pub timestamp_ms: i64,
}

impl ScoreRecord {
    #[must_use]
    pub fn new(
        date: NaiveDate,
        difficulty: Difficulty,
        completion: &Completion,
        timestamp_ms: i64,
    ) -> Self {
        Self {
            date,
            difficulty,
            distance: completion.distance,
            optimal_distance: completion.optimal_distance,
            efficiency: completion.efficiency,
            attempts: completion.attempts,
            timestamp_ms,
        }
    }

    /// Canonical two-decimal percentage label.
    #[must_use]
    pub fn efficiency_label(&self) -> String {
        format!("{:.2}%", self.efficiency)
    }
}
