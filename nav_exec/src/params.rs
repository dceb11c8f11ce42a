//! # Navigation Executable Parameters
//!
//! This module provides parameters for the navigation executable.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::loc::HeadingFrame;
use crate::motor::MotorKind;
use crate::sim_client::SimParams;
use crate::wp_ctrl::Waypoint;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavExecParams {

    /// Target period of one cycle
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Maximum number of cycles to run before stopping
    pub max_cycles: u64,

    /// The motor adapter to drive the simulated vehicle through
    pub motor_kind: MotorKind,

    /// The heading frame the controller steers in
    pub heading_frame: HeadingFrame,

    /// The simulated vehicle
    pub sim: SimParams,

    /// Waypoints to visit, used unless a route file is given on the command
    /// line
    #[serde(default)]
    pub route: Vec<Waypoint>
}

/// A route loaded from its own file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteFile {
    pub waypoints: Vec<Waypoint>
}
