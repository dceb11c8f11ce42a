//! # Waypoint control module
//!
//! Waypoint control steers the vehicle through an ordered route of waypoints.
//! Each tick the controller compares the vehicle's pose against the current
//! target waypoint and selects exactly one of the following branches:
//!
//! 1. **Reached** - the vehicle is within the position tolerance of the
//!    target. The route cursor advances (wrapping at the end of the route)
//!    and the motors are stopped.
//! 2. **Correction** - the target lies within a fixed window either side of
//!    the heading. A lateral error controller biases the wheel speeds to
//!    bring the target back onto the vehicle's axis.
//! 3. **Rotate in place** - the target lies outside the angle tolerance, the
//!    vehicle point turns towards it.
//! 4. **Straight** - otherwise drive forward.
//!
//! The lateral error is the perpendicular offset of the target from the
//! vehicle's forward axis, divided by the distance to the target (with a
//! floor on the distance so the error does not explode close to the
//! target). The correction is a PD law on this normalised error.
//!
//! The controller reads the pose through a `PoseSource` and commands motors
//! through a `MotorSink`, both of which must be configured before navigation
//! can start.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod cmd;
pub mod params;
pub mod route;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use params::{LoopMode, Params};
pub use route::*;
pub use state::*;
use util::params as util_params;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Half-width of the window either side of the heading in which the lateral
/// correction is applied.
///
/// Units: degrees
pub const CORRECTION_WINDOW_DEG: f64 = 45.0;

/// Floor on the distance used to normalise the lateral error.
///
/// Units: millimetres
pub const LAT_ERROR_MIN_DIST_MM: f64 = 10.0;

/// Scale applied to the gain-weighted lateral error to bring it into wheel
/// speed percent.
pub const PROP_SCALE: f64 = 100.0;

/// Coefficient on the change in lateral error between ticks.
pub const DERIV_COEFF: f64 = 20.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur in the waypoint control module.
#[derive(Debug, thiserror::Error)]
pub enum WpCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util_params::LoadError),

    #[error("No pose source has been configured")]
    NoPoseSource,

    #[error("No motor sink has been configured")]
    NoMotorSink,

    #[error("Cannot start navigation with an empty route")]
    EmptyRoute
}
