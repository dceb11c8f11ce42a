//! # Localisation module
//!
//! This module provides localisation for the vehicle in the form of wheel
//! odometry (dead reckoning). The pose is estimated purely by integrating the
//! incremental motion of the left and right wheels, there is no correction
//! from any external reference.
//!
//! Frame conventions used by the estimator:
//!
//! - Positions are in millimetres in the Odometry (OD) frame, whose origin is
//!   wherever the vehicle was when the estimator was initialised or reset.
//! - Heading is the angle from the +ve OD_X axis in radians, kept in the
//!   range (-pi, pi], and increases when the right wheel travels further
//!   than the left.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod odometry;
mod params;
mod source;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
pub use odometry::*;
pub use params::CalibrationParams;
pub use source::*;
use util::maths::norm_angle_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose (position and heading in the OD frame) of the vehicle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {

    /// The position in the OD frame.
    ///
    /// Units: millimetres
    pub position_mm: Vector2<f64>,

    /// The heading (angle to the positive OD_X axis) of the vehicle.
    ///
    /// Units: radians, in the range (-pi, pi]
    pub heading_rad: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur in the localisation module.
#[derive(Debug, thiserror::Error)]
pub enum LocError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("The track width must be greater than zero, found {0} mm")]
    InvalidTrackWidth(f64),

    #[error("The number of encoder ticks per metre must be greater than zero, found {0}")]
    InvalidTicksPerMetre(f64)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {

    /// Create a new pose, normalising the heading into (-pi, pi].
    pub fn new(x_mm: f64, y_mm: f64, heading_rad: f64) -> Self {
        Self {
            position_mm: Vector2::new(x_mm, y_mm),
            heading_rad: norm_angle_pi(heading_rad)
        }
    }

    /// The X coordinate of the position in millimetres.
    pub fn x_mm(&self) -> f64 {
        self.position_mm[0]
    }

    /// The Y coordinate of the position in millimetres.
    pub fn y_mm(&self) -> f64 {
        self.position_mm[1]
    }

    /// Return the heading in degrees, in the range (-180, 180].
    pub fn heading_deg(&self) -> f64 {
        self.heading_rad.to_degrees()
    }

    /// Unit vector pointing along the vehicle's forward axis.
    pub fn forward2(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }

    /// Unit vector perpendicular to the forward axis, pointing to the
    /// vehicle's left.
    pub fn left2(&self) -> Vector2<f64> {
        Vector2::new(-self.heading_rad.sin(), self.heading_rad.cos())
    }

    /// Euclidean distance from the vehicle to the given point.
    pub fn distance_to(&self, point_mm: &Vector2<f64>) -> f64 {
        (point_mm - self.position_mm).norm()
    }
}
