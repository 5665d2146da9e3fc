//! Puzzle data: nodes, boards, and difficulty tiers.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Point, distance};

/// Edge length of the square board used by the daily generator.
pub const BOARD_SIZE: f64 = 1000.0;

/// A delivery stop on the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

impl Stop {
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One node of a tour. The depot is unique per puzzle; stops carry ids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Depot { x: f64, y: f64 },
    Stop { id: u32, x: f64, y: f64 },
}

/// Identity key for a node: every depot is the same place, stops match by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Depot,
    Stop(u32),
}

impl Node {
    #[must_use]
    pub const fn position(&self) -> Point {
        match *self {
            Self::Depot { x, y } | Self::Stop { x, y, .. } => Point::new(x, y),
        }
    }

    #[must_use]
    pub const fn key(&self) -> NodeKey {
        match *self {
            Self::Depot { .. } => NodeKey::Depot,
            Self::Stop { id, .. } => NodeKey::Stop(id),
        }
    }

    #[must_use]
    pub const fn is_depot(&self) -> bool {
        matches!(self, Self::Depot { .. })
    }

    #[must_use]
    pub const fn stop_id(&self) -> Option<u32> {
        match *self {
            Self::Depot { .. } => None,
            Self::Stop { id, .. } => Some(id),
        }
    }

    /// Identity equality: positions are fixed per puzzle and do not
    /// participate.
    #[must_use]
    pub fn same_node(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl From<Stop> for Node {
    fn from(stop: Stop) -> Self {
        Self::Stop {
            id: stop.id,
            x: stop.x,
            y: stop.y,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// The hardest tier ships without a revealable solution.
    #[must_use]
    pub const fn solution_available(self) -> bool {
        !matches!(self, Self::Hard)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

/// Errors raised while validating puzzle data.
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("puzzle has no stops")]
    NoStops,
    #[error("duplicate stop id {0}")]
    DuplicateStopId(u32),
    #[error("optimal distance must be positive, got {0}")]
    NonPositiveOptimal(f64),
    #[error("invalid puzzle JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// An immutable daily puzzle instance.
///
/// Puzzle files carry additional provider-owned fields (notably the
/// precomputed optimal route); those are deliberately not modeled here and
/// surface through the provider's solution endpoint instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    pub date: NaiveDate,
    pub depot: Point,
    pub stops: Vec<Stop>,
    pub optimal_distance: f64,
}

impl Puzzle {
    /// Build a validated puzzle.
    ///
    /// # Errors
    ///
    /// Returns an error when the stop set is empty, a stop id repeats, or
    /// the optimal distance is not positive.
    pub fn new(
        date: NaiveDate,
        depot: Point,
        stops: Vec<Stop>,
        optimal_distance: f64,
    ) -> Result<Self, PuzzleError> {
        let puzzle = Self {
            date,
            depot,
            stops,
            optimal_distance,
        };
        puzzle.validate()?;
        Ok(puzzle)
    }

    /// Parse and validate a puzzle wire file.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed or the data fails
    /// validation.
    pub fn from_json(json: &str) -> Result<Self, PuzzleError> {
        let puzzle: Self = serde_json::from_str(json)?;
        puzzle.validate()?;
        Ok(puzzle)
    }

    fn validate(&self) -> Result<(), PuzzleError> {
        if self.stops.is_empty() {
            return Err(PuzzleError::NoStops);
        }
        let mut seen = HashSet::with_capacity(self.stops.len());
        for stop in &self.stops {
            if !seen.insert(stop.id) {
                return Err(PuzzleError::DuplicateStopId(stop.id));
            }
        }
        if self.optimal_distance.is_nan() || self.optimal_distance <= 0.0 {
            return Err(PuzzleError::NonPositiveOptimal(self.optimal_distance));
        }
        Ok(())
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    #[must_use]
    pub const fn depot_node(&self) -> Node {
        Node::Depot {
            x: self.depot.x,
            y: self.depot.y,
        }
    }

    #[must_use]
    pub fn stop_ids(&self) -> HashSet<u32> {
        self.stops.iter().map(|s| s.id).collect()
    }

    /// Nearest node within `radius` of `point`, or `None` when the point
    /// lands on empty board.
    #[must_use]
    pub fn node_at(&self, point: Point, radius: f64) -> Option<Node> {
        let mut best: Option<(f64, Node)> = None;
        let mut consider = |node: Node| {
            let d = distance(node.position(), point);
            if d <= radius && best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, node));
            }
        };
        consider(self.depot_node());
        for stop in &self.stops {
            consider(Node::from(*stop));
        }
        best.map(|(_, node)| node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Puzzle {
        Puzzle::new(
            NaiveDate::from_ymd_opt(2026, 8, 8).unwrap(),
            Point::new(500.0, 500.0),
            vec![
                Stop {
                    id: 1,
                    x: 100.0,
                    y: 100.0,
                },
                Stop {
                    id: 2,
                    x: 900.0,
                    y: 100.0,
                },
            ],
            1000.0,
        )
        .unwrap()
    }

    #[test]
    fn node_identity_ignores_position() {
        let a = Node::Depot { x: 0.0, y: 0.0 };
        let b = Node::Depot { x: 500.0, y: 500.0 };
        assert!(a.same_node(&b));

        let s1 = Node::Stop {
            id: 3,
            x: 1.0,
            y: 1.0,
        };
        let s2 = Node::Stop {
            id: 3,
            x: 2.0,
            y: 2.0,
        };
        let s3 = Node::Stop {
            id: 4,
            x: 1.0,
            y: 1.0,
        };
        assert!(s1.same_node(&s2));
        assert!(!s1.same_node(&s3));
        assert!(!s1.same_node(&a));
    }

    #[test]
    fn node_wire_form_is_kind_tagged() {
        let node: Node = serde_json::from_str(r#"{"kind":"stop","id":7,"x":300.0,"y":200.0}"#)
            .expect("stop parses");
        assert_eq!(node.stop_id(), Some(7));
        let depot: Node =
            serde_json::from_str(r#"{"kind":"depot","x":500.0,"y":500.0}"#).expect("depot parses");
        assert!(depot.is_depot());
        let round_trip = serde_json::to_string(&node).unwrap();
        assert!(round_trip.contains(r#""kind":"stop""#));
    }

    #[test]
    fn puzzle_validation_rejects_bad_data() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 8).unwrap();
        let depot = Point::new(500.0, 500.0);
        let stop = Stop {
            id: 1,
            x: 100.0,
            y: 100.0,
        };
        assert!(matches!(
            Puzzle::new(date, depot, vec![], 10.0),
            Err(PuzzleError::NoStops)
        ));
        assert!(matches!(
            Puzzle::new(date, depot, vec![stop, stop], 10.0),
            Err(PuzzleError::DuplicateStopId(1))
        ));
        assert!(matches!(
            Puzzle::new(date, depot, vec![stop], 0.0),
            Err(PuzzleError::NonPositiveOptimal(_))
        ));
    }

    #[test]
    fn puzzle_file_parses_and_ignores_provider_fields() {
        let json = r#"{
            "date": "2026-08-08",
            "depot": {"x": 500.0, "y": 500.0},
            "stops": [{"id": 1, "x": 100.0, "y": 100.0}],
            "optimal_distance": 1131.37,
            "optimal_route": [{"kind": "depot", "x": 500.0, "y": 500.0}]
        }"#;
        let puzzle = Puzzle::from_json(json).expect("valid file");
        assert_eq!(puzzle.date, NaiveDate::from_ymd_opt(2026, 8, 8).unwrap());
        assert_eq!(puzzle.stop_count(), 1);
    }

    #[test]
    fn hit_test_picks_nearest_within_radius() {
        let puzzle = board();
        let hit = puzzle.node_at(Point::new(110.0, 95.0), 36.0).unwrap();
        assert_eq!(hit.stop_id(), Some(1));
        assert!(puzzle.node_at(Point::new(300.0, 300.0), 36.0).is_none());
        let depot = puzzle.node_at(Point::new(520.0, 480.0), 36.0).unwrap();
        assert!(depot.is_depot());
    }

    #[test]
    fn difficulty_round_trips_and_gates_solutions() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.as_str().parse::<Difficulty>(), Ok(difficulty));
        }
        assert!("brutal".parse::<Difficulty>().is_err());
        assert!(Difficulty::Easy.solution_available());
        assert!(Difficulty::Medium.solution_available());
        assert!(!Difficulty::Hard.solution_available());
    }
}
