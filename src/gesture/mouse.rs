//! Mouse gesture: level-sampled deltas accumulated into a cursor position.

use crate::device::{DeviceKind, MouseId, StateStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Addressable surface extent. Positions are valid on `[0, width] x [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamps each axis independently.
    pub fn clamp(&self, point: Point) -> Point {
        let max_x = i32::try_from(self.width).unwrap_or(i32::MAX);
        let max_y = i32::try_from(self.height).unwrap_or(i32::MAX);
        Point {
            x: point.x.clamp(0, max_x),
            y: point.y.clamp(0, max_y),
        }
    }
}

/// What the engine keeps after handing a proposed position to the consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccumulatorPolicy {
    /// Store the proposal clamped to the surface bounds.
    #[default]
    Clamped,
    /// Store the raw running sum (saturating at the `i32` limits).
    Unbounded,
}

/// One frame's mouse motion and button levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseGesture {
    pub old: Point,
    /// Unclamped `old + delta`.
    pub new: Point,
    pub left: bool,
    pub right: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct CursorAccumulator {
    position: Point,
    policy: AccumulatorPolicy,
    bounds: Bounds,
}

impl CursorAccumulator {
    pub fn new(policy: AccumulatorPolicy, bounds: Bounds) -> Self {
        Self {
            position: Point::default(),
            policy,
            bounds,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn reset(&mut self) {
        self.position = Point::default();
    }

    /// Applies a delta and returns the gesture carrying the proposal.
    pub fn advance(&mut self, dx: i32, dy: i32, left: bool, right: bool) -> MouseGesture {
        let old = self.position;
        let new = old.offset(dx, dy);

        self.position = match self.policy {
            AccumulatorPolicy::Clamped => self.bounds.clamp(new),
            AccumulatorPolicy::Unbounded => new,
        };

        MouseGesture {
            old,
            new,
            left,
            right,
        }
    }
}

/// Reads port 0's mouse cells every frame, changed or not. Axis cells hold a
/// signed displacement, reinterpreted from the wire `u16`.
pub fn derive_mouse(store: &StateStore, cursor: &mut CursorAccumulator) -> MouseGesture {
    let slot = store.slot(DeviceKind::Mouse);
    let dx = slot.read(0, 0, MouseId::X.id()) as i16;
    let dy = slot.read(0, 0, MouseId::Y.id()) as i16;
    let left = slot.read(0, 0, MouseId::Left.id()) != 0;
    let right = slot.read(0, 0, MouseId::Right.id()) != 0;

    let gesture = cursor.advance(i32::from(dx), i32::from(dy), left, right);
    if gesture.new != gesture.old {
        debug!(
            "Mouse moved ({}, {}) -> ({}, {})",
            gesture.old.x, gesture.old.y, gesture.new.x, gesture.new.y
        );
    }
    gesture
}
