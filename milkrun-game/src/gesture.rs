//! Pointer gesture decoding: taps, drags, and drag traversals.
//!
//! The decoder owns its cursor state directly and is updated synchronously,
//! because a continuous drag issues rapid-fire intents that each depend on
//! the previous one's effect on the route.

use crate::geometry::Point;
use crate::puzzle::{Node, NodeKey};
use crate::route::Intent;
use crate::session::GameSession;

/// Hit radius for precise pointers, in board units.
pub const POINTER_HIT_RADIUS: f64 = 36.0;
/// Hit radius for coarse (touch) pointers, in board units.
pub const TOUCH_HIT_RADIUS: f64 = 60.0;

/// Converts raw pointer sequences into route intents.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureDecoder {
    radius: f64,
    active: bool,
    moved: bool,
    /// Last node the pointer crossed during the current gesture; gates
    /// one-visit-per-drag.
    cursor: Option<NodeKey>,
    position: Option<Point>,
}

impl GestureDecoder {
    #[must_use]
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            active: false,
            moved: false,
            cursor: None,
            position: None,
        }
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Pointer down. Arms a potential drag even on empty board, so a drag
    /// can start from empty space and sweep into a node. Never emits.
    pub fn press(&mut self, point: Point, session: &GameSession) {
        self.active = true;
        self.moved = false;
        self.position = Some(point);
        self.cursor = session.node_at(point, self.radius).map(|n| n.key());
    }

    /// Pointer movement. Crossing a fresh node during a drag emits a visit
    /// intent hinted with the route tail at the moment of crossing; the
    /// current tail and already-visited stops never re-trigger.
    pub fn drag(&mut self, point: Point, session: &GameSession) -> Option<Intent> {
        if !self.active {
            return None;
        }
        self.moved = true;
        self.position = Some(point);
        let node = session.node_at(point, self.radius)?;
        let key = node.key();
        if self.cursor == Some(key) {
            return None;
        }
        self.cursor = Some(key);
        let route = session.route();
        if route.tail().is_some_and(|tail| tail.key() == key) {
            return None;
        }
        if let Some(id) = node.stop_id()
            && route.visited().contains(&id)
        {
            return None;
        }
        Some(Intent::Visit {
            target: node,
            from: route.tail().copied(),
        })
    }

    /// Pointer up. A release without any synchronous move event in between
    /// is a tap at the release position, even when press and release landed
    /// on different nodes. A release that ends a drag only disarms.
    pub fn release(&mut self, point: Point, session: &GameSession) -> Option<Intent> {
        let was_active = self.active;
        let moved = self.moved;
        self.active = false;
        self.moved = false;
        self.cursor = None;
        self.position = None;
        if !was_active || moved {
            return None;
        }
        let node = session.node_at(point, self.radius)?;
        Some(decode_tap(node, session))
    }

    /// Abandon the gesture without emitting (pointer cancel, puzzle swap).
    pub fn cancel(&mut self) {
        self.active = false;
        self.moved = false;
        self.cursor = None;
        self.position = None;
    }

    /// Live pointer position while a drag is in flight, for the renderer's
    /// provisional segment.
    #[must_use]
    pub fn preview(&self) -> Option<Point> {
        if self.active && self.moved {
            self.position
        } else {
            None
        }
    }
}

impl Default for GestureDecoder {
    fn default() -> Self {
        Self::new(POINTER_HIT_RADIUS)
    }
}

/// Tap decode order: tip retreat, then anything the machine would accept as
/// a visit, then the node behind the tip as a retreat. Falls through to a
/// visit the machine rejects silently.
fn decode_tap(node: Node, session: &GameSession) -> Intent {
    let route = session.route().route();
    let key = node.key();
    if route.last().is_some_and(|tail| tail.key() == key) {
        return Intent::Retreat { target: node };
    }
    let visit = Intent::Visit {
        target: node,
        from: None,
    };
    // Probe against a copy so the legality rules live in exactly one place.
    let mut probe = session.route().clone();
    if probe.apply(&visit, session.puzzle()).mutated() {
        return visit;
    }
    if route.len() >= 2 && route[route.len() - 2].key() == key {
        return Intent::Retreat { target: node };
    }
    visit
}
