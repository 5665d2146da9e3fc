//! The route state machine: ordered tour construction, one intent at a time.
//!
//! All player input funnels into [`RouteState::apply`]. Illegal moves are the
//! normal path here, not an exceptional one: they reject silently and leave
//! the state untouched.

use std::collections::HashSet;

use smallvec::SmallVec;

use crate::geometry::path_length;
use crate::puzzle::{Node, Puzzle};

/// Inline capacity for tour storage. The largest legal tour is sixteen stops
/// plus the opening and closing depot entries.
pub type RouteVec = SmallVec<[Node; 20]>;

/// A mutation request decoded from player input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Extend the route onto `target`. `from` carries the drag origin and
    /// must match the current tail when present; a stale hint rejects the
    /// whole intent.
    Visit { target: Node, from: Option<Node> },
    /// Step the route back if `target` is the tip or the node behind it.
    Retreat { target: Node },
    /// Pop a single trailing node, whatever it is.
    Undo,
    /// Clear the in-progress route.
    Reset,
}

/// Result of applying one intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Mutated,
    Rejected,
}

impl Applied {
    #[must_use]
    pub const fn mutated(self) -> bool {
        matches!(self, Self::Mutated)
    }
}

/// Ordered tour under construction, with the redundant visited set kept in
/// lock-step so hit-testing stays O(1).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteState {
    route: RouteVec,
    visited: HashSet<u32>,
    attempt_started: bool,
    complete: bool,
}

impl RouteState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn route(&self) -> &[Node] {
        &self.route
    }

    #[must_use]
    pub const fn visited(&self) -> &HashSet<u32> {
        &self.visited
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    #[must_use]
    pub const fn attempt_started(&self) -> bool {
        self.attempt_started
    }

    #[must_use]
    pub fn tail(&self) -> Option<&Node> {
        self.route.last()
    }

    /// Distance of the current route, provisional tours included.
    #[must_use]
    pub fn current_distance(&self) -> f64 {
        path_length(self.route.iter().map(Node::position))
    }

    /// Apply one intent to completion. Never interleaves: the full effect of
    /// each intent lands before the next is accepted.
    pub fn apply(&mut self, intent: &Intent, puzzle: &Puzzle) -> Applied {
        match intent {
            Intent::Visit { target, from } => self.visit(*target, *from, puzzle),
            Intent::Retreat { target } => self.retreat(target),
            Intent::Undo => self.undo(),
            Intent::Reset => self.reset(),
        }
    }

    fn visit(&mut self, target: Node, from: Option<Node>, puzzle: &Puzzle) -> Applied {
        if self.complete {
            return Applied::Rejected;
        }
        // Drag hints guard against stale gestures after an out-of-band
        // mutation: the claimed origin must still be the tail.
        if let Some(origin) = from {
            match self.route.last() {
                Some(tail) if tail.same_node(&origin) => {}
                _ => return Applied::Rejected,
            }
        }
        match target {
            Node::Stop { id, .. } => {
                if self.visited.contains(&id) {
                    return Applied::Rejected;
                }
                if self.route.is_empty() {
                    self.route.push(puzzle.depot_node());
                }
                self.route.push(target);
                self.visited.insert(id);
                self.attempt_started = true;
                Applied::Mutated
            }
            Node::Depot { .. } => {
                if self.visited.len() != puzzle.stop_count() {
                    return Applied::Rejected;
                }
                let tail_is_depot = self.route.last().is_some_and(Node::is_depot);
                if self.route.len() > 1 || !tail_is_depot {
                    self.route.push(target);
                    Applied::Mutated
                } else {
                    Applied::Rejected
                }
            }
        }
    }

    fn retreat(&mut self, target: &Node) -> Applied {
        let len = self.route.len();
        let tail_match = self.route.last().is_some_and(|n| n.same_node(target));
        let prev_match = len >= 2 && self.route[len - 2].same_node(target);
        if !tail_match && !prev_match {
            return Applied::Rejected;
        }
        self.pop_tail();
        Applied::Mutated
    }

    fn undo(&mut self) -> Applied {
        if self.route.is_empty() {
            return Applied::Rejected;
        }
        self.pop_tail();
        Applied::Mutated
    }

    fn reset(&mut self) -> Applied {
        if self.route.is_empty() && !self.complete {
            return Applied::Rejected;
        }
        self.route.clear();
        self.visited.clear();
        self.attempt_started = false;
        self.complete = false;
        Applied::Mutated
    }

    fn pop_tail(&mut self) {
        if let Some(node) = self.route.pop()
            && let Some(id) = node.stop_id()
        {
            self.visited.remove(&id);
        }
        self.complete = false;
        // A route collapsed to the lone opening depot (or less) is no longer
        // a real attempt; anything longer still is.
        self.attempt_started = self.route.len() > 1;
    }

    /// Called by the evaluator once a win is confirmed.
    pub(crate) fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub(crate) fn clear_attempt_started(&mut self) {
        self.attempt_started = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::puzzle::Stop;
    use chrono::NaiveDate;

    fn puzzle() -> Puzzle {
        Puzzle::new(
            NaiveDate::from_ymd_opt(2026, 8, 8).unwrap(),
            Point::new(0.0, 0.0),
            vec![
                Stop {
                    id: 1,
                    x: 10.0,
                    y: 0.0,
                },
                Stop {
                    id: 2,
                    x: 10.0,
                    y: 10.0,
                },
            ],
            30.0,
        )
        .unwrap()
    }

    fn stop(puzzle: &Puzzle, id: u32) -> Node {
        Node::from(*puzzle.stops.iter().find(|s| s.id == id).unwrap())
    }

    fn visit(target: Node) -> Intent {
        Intent::Visit { target, from: None }
    }

    #[test]
    fn opening_visit_seeds_depot() {
        let puzzle = puzzle();
        let mut state = RouteState::new();
        assert!(state.apply(&visit(stop(&puzzle, 1)), &puzzle).mutated());
        assert_eq!(state.route().len(), 2);
        assert!(state.route()[0].is_depot());
        assert!(state.attempt_started());
        assert!(state.visited().contains(&1));
    }

    #[test]
    fn depot_cannot_open_a_route() {
        let puzzle = puzzle();
        let mut state = RouteState::new();
        assert_eq!(
            state.apply(&visit(puzzle.depot_node()), &puzzle),
            Applied::Rejected
        );
        assert!(state.route().is_empty());
    }

    #[test]
    fn duplicate_stop_visit_is_idempotent() {
        let puzzle = puzzle();
        let mut state = RouteState::new();
        state.apply(&visit(stop(&puzzle, 1)), &puzzle);
        let before = (state.route().len(), state.visited().len());
        assert_eq!(
            state.apply(&visit(stop(&puzzle, 1)), &puzzle),
            Applied::Rejected
        );
        assert_eq!(before, (state.route().len(), state.visited().len()));
    }

    #[test]
    fn depot_close_requires_full_visitation() {
        let puzzle = puzzle();
        let mut state = RouteState::new();
        state.apply(&visit(stop(&puzzle, 1)), &puzzle);
        assert_eq!(
            state.apply(&visit(puzzle.depot_node()), &puzzle),
            Applied::Rejected
        );
        state.apply(&visit(stop(&puzzle, 2)), &puzzle);
        assert!(state.apply(&visit(puzzle.depot_node()), &puzzle).mutated());
        assert_eq!(state.route().len(), 4);
        assert!(state.route().last().unwrap().is_depot());
    }

    #[test]
    fn stale_from_hint_rejects_the_intent() {
        let puzzle = puzzle();
        let mut state = RouteState::new();
        state.apply(&visit(stop(&puzzle, 1)), &puzzle);
        let stale = Intent::Visit {
            target: stop(&puzzle, 2),
            from: Some(puzzle.depot_node()),
        };
        assert_eq!(state.apply(&stale, &puzzle), Applied::Rejected);
        let fresh = Intent::Visit {
            target: stop(&puzzle, 2),
            from: Some(stop(&puzzle, 1)),
        };
        assert!(state.apply(&fresh, &puzzle).mutated());
    }

    #[test]
    fn retreat_pops_from_tip_or_behind_it() {
        let puzzle = puzzle();
        let mut state = RouteState::new();
        state.apply(&visit(stop(&puzzle, 1)), &puzzle);
        state.apply(&visit(stop(&puzzle, 2)), &puzzle);

        // Tapping the node behind the tip pops the tip.
        let behind = Intent::Retreat {
            target: stop(&puzzle, 1),
        };
        assert!(state.apply(&behind, &puzzle).mutated());
        assert_eq!(state.route().len(), 2);
        assert!(!state.visited().contains(&2));

        // Tapping the tip itself pops it too.
        let tip = Intent::Retreat {
            target: stop(&puzzle, 1),
        };
        assert!(state.apply(&tip, &puzzle).mutated());
        assert_eq!(state.route().len(), 1);
        assert!(!state.attempt_started());

        // An unrelated target is a no-op.
        let elsewhere = Intent::Retreat {
            target: stop(&puzzle, 2),
        };
        assert_eq!(state.apply(&elsewhere, &puzzle), Applied::Rejected);
    }

    #[test]
    fn undo_round_trip_returns_to_empty() {
        let puzzle = puzzle();
        let mut state = RouteState::new();
        state.apply(&visit(stop(&puzzle, 1)), &puzzle);
        state.apply(&visit(stop(&puzzle, 2)), &puzzle);
        state.apply(&visit(puzzle.depot_node()), &puzzle);
        // Opening visit pushed two nodes, so one extra undo clears the seed
        // depot as well.
        for _ in 0..4 {
            state.apply(&Intent::Undo, &puzzle);
        }
        assert!(state.route().is_empty());
        assert!(state.visited().is_empty());
        assert!(!state.attempt_started());
        assert_eq!(state.apply(&Intent::Undo, &puzzle), Applied::Rejected);
    }

    #[test]
    fn reset_clears_route_state_only() {
        let puzzle = puzzle();
        let mut state = RouteState::new();
        assert_eq!(state.apply(&Intent::Reset, &puzzle), Applied::Rejected);
        state.apply(&visit(stop(&puzzle, 1)), &puzzle);
        assert!(state.apply(&Intent::Reset, &puzzle).mutated());
        assert!(state.route().is_empty());
        assert!(state.visited().is_empty());
        assert!(!state.attempt_started());
    }

    #[test]
    fn completion_gates_further_visits() {
        let puzzle = puzzle();
        let mut state = RouteState::new();
        state.apply(&visit(stop(&puzzle, 1)), &puzzle);
        state.apply(&visit(stop(&puzzle, 2)), &puzzle);
        state.apply(&visit(puzzle.depot_node()), &puzzle);
        state.mark_complete();
        assert_eq!(
            state.apply(&visit(stop(&puzzle, 1)), &puzzle),
            Applied::Rejected
        );
        // Undo reopens the route and restores the attempt flag.
        assert!(state.apply(&Intent::Undo, &puzzle).mutated());
        assert!(!state.is_complete());
        assert!(state.attempt_started());
    }

    #[test]
    fn current_distance_tracks_provisional_tours() {
        let puzzle = puzzle();
        let mut state = RouteState::new();
        assert!(state.current_distance().abs() < 1e-9);
        state.apply(&visit(stop(&puzzle, 1)), &puzzle);
        assert!((state.current_distance() - 10.0).abs() < 1e-9);
        state.apply(&visit(stop(&puzzle, 2)), &puzzle);
        assert!((state.current_distance() - 20.0).abs() < 1e-9);
    }
}
