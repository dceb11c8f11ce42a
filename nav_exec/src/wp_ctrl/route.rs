//! Waypoint routes

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A target position, in the same frame as the vehicle's pose.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct Waypoint {
    /// Units: millimetres
    pub x_mm: f64,

    /// Units: millimetres
    pub y_mm: f64
}

/// An ordered sequence of waypoints and a cursor to the current target.
///
/// Whenever the route is non-empty the cursor is a valid index into it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Route {
    waypoints: Vec<Waypoint>,

    current_index: usize
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    pub fn new(x_mm: f64, y_mm: f64) -> Self {
        Self { x_mm, y_mm }
    }

    /// The waypoint as a position vector.
    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x_mm, self.y_mm)
    }
}

impl Route {

    /// Create a route visiting the given waypoints in order.
    pub fn from_waypoints(waypoints: Vec<Waypoint>) -> Self {
        Self {
            waypoints,
            current_index: 0
        }
    }

    /// Append a waypoint to the end of the route.
    pub fn push(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
    }

    /// Remove all waypoints and reset the cursor.
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.current_index = 0;
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The waypoint under the cursor, or `None` if the route is empty.
    pub fn current(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.current_index)
    }

    /// Move the cursor to the next waypoint, wrapping to the start after the
    /// final one.
    ///
    /// Returns true if the cursor wrapped back to the first waypoint.
    pub fn advance(&mut self) -> bool {
        if self.waypoints.is_empty() {
            return false
        }

        self.current_index = (self.current_index + 1) % self.waypoints.len();

        self.current_index == 0
    }

    /// Move the cursor back to the first waypoint.
    pub fn rewind(&mut self) {
        self.current_index = 0;
    }
}
