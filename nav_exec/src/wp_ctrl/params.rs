//! Waypoint control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for waypoint control.
///
/// Missing fields in a parameter file take their default values. Values
/// loaded from a file are passed through the controller's setters, so the
/// speed and gain are clamped in the same way as at runtime.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Params {

    /// Nominal forward speed.
    ///
    /// Units: percent, in [0, 100]
    pub speed: f64,

    /// Distance within which a waypoint is considered reached.
    ///
    /// Units: millimetres
    pub position_tolerance_mm: f64,

    /// Heading error above which the vehicle point turns towards the target
    /// rather than driving forward.
    ///
    /// Units: degrees
    pub angle_tolerance_deg: f64,

    /// Proportional gain on the normalised lateral error, in [0, 1].
    pub correction_gain: f64,

    /// Limit on the magnitude of the correction applied to each wheel.
    ///
    /// Units: percent
    pub max_correction: f64,

    /// If false the correction branch is never taken.
    pub correction_enabled: bool,

    /// What to do after the final waypoint is reached.
    pub loop_mode: LoopMode
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Behaviour of the route cursor when the final waypoint is reached.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Stop navigating once the final waypoint is reached.
    Once,

    /// Start again from the first waypoint.
    Forever
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            speed: 50.0,
            position_tolerance_mm: 10.0,
            angle_tolerance_deg: 10.0,
            correction_gain: 0.5,
            max_correction: 30.0,
            correction_enabled: true,
            loop_mode: LoopMode::default()
        }
    }
}

impl Default for LoopMode {
    fn default() -> Self {
        LoopMode::Forever
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_file() {
        let p: Params = util::params::from_str(
            "speed = 70.0\nloop_mode = \"once\""
        ).unwrap();

        assert_eq!(p.speed, 70.0);
        assert_eq!(p.loop_mode, LoopMode::Once);
        assert_eq!(p.max_correction, 30.0);
        assert!(p.correction_enabled);
    }
}
