//! Odometry calibration parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::LocError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Calibration of the wheel odometry.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct CalibrationParams {

    /// Distance between the contact points of the left and right wheels.
    ///
    /// Units: millimetres
    pub track_width_mm: f64,

    /// Number of encoder ticks produced per metre of wheel travel.
    ///
    /// Units: ticks/metre
    pub ticks_per_m: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            track_width_mm: 170.0,
            ticks_per_m: 1000.0
        }
    }
}

impl CalibrationParams {

    /// Check that both calibration values are strictly positive.
    ///
    /// NaN values are rejected as well.
    pub fn validate(&self) -> Result<(), LocError> {
        if !(self.track_width_mm > 0.0) {
            return Err(LocError::InvalidTrackWidth(self.track_width_mm))
        }
        if !(self.ticks_per_m > 0.0) {
            return Err(LocError::InvalidTicksPerMetre(self.ticks_per_m))
        }

        Ok(())
    }

    /// Convert a number of encoder ticks into millimetres of wheel travel.
    pub fn ticks_to_mm(&self, ticks: i32) -> f64 {
        ticks as f64 * 1000.0 / self.ticks_per_m
    }
}
