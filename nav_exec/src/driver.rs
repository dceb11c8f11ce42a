//! # Navigation driver
//!
//! The driver owns the pose estimator and the waypoint controller and runs
//! them in the required order each cycle:
//!
//! 1. The estimator integrates the wheel tick increments for the cycle and
//!    publishes the new pose through its handle.
//! 2. The controller reads the pose from its source, ticks, and forwards the
//!    result to its motor sink.
//!
//! The driver must be cycled periodically (nominally every
//! `CYCLE_PERIOD_S`) and never reentrantly. `cycle` takes `&mut self` so
//! the latter holds by construction.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use crate::loc::{Pose, PoseEstimator, WheelTicks};
use crate::wp_ctrl::{Branch, StatusReport, TickResult, WaypointCtrl};
use util::{
    archive::{Archived, ArchiveError, Archiver},
    module::State
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Nominal period of one cycle.
///
/// Units: seconds
pub const CYCLE_PERIOD_S: f64 = 0.05;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Anything which can provide the wheel tick increments since it was last
/// asked.
pub trait EncoderSource {
    /// Return the ticks accumulated since the last call, and reset the
    /// accumulation.
    fn take_deltas(&mut self) -> WheelTicks;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Periodic driver for the estimator and controller.
pub struct NavDriver {
    estimator: PoseEstimator,

    ctrl: WaypointCtrl,

    /// Number of cycles run
    num_cycles: u64,

    /// Record of the last cycle, written to the archive
    last_record: CycleRecord,

    arch: Option<Archiver>
}

/// Flat record of a single cycle, suitable for CSV archiving.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct CycleRecord {
    pub cycle: u64,

    pub left_ticks: i32,
    pub right_ticks: i32,

    pub x_mm: f64,
    pub y_mm: f64,
    pub heading_deg: f64,

    pub branch: Branch,
    pub target_index: usize,
    pub distance_mm: f64,
    pub angle_diff_deg: f64,
    pub lat_error_norm: f64,
    pub correction: f64,

    /// Commanded wheel speeds, empty if the previous command was held
    pub left_speed: Option<f64>,
    pub right_speed: Option<f64>,

    /// Index of the waypoint reached this cycle, if any
    pub reached_index: Option<usize>,

    pub route_completed: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl NavDriver {

    /// Create a new driver.
    ///
    /// The controller's pose source should be the estimator's handle (or an
    /// adapter around it), otherwise estimator updates will not reach the
    /// controller.
    pub fn new(estimator: PoseEstimator, ctrl: WaypointCtrl) -> Self {
        Self {
            estimator,
            ctrl,
            num_cycles: 0,
            last_record: CycleRecord::default(),
            arch: None
        }
    }

    /// Archive each cycle's record with the given archiver.
    pub fn set_archiver(&mut self, arch: Archiver) {
        self.arch = Some(arch);
    }

    /// Run one cycle with the given tick increments.
    pub fn cycle(&mut self, ticks: &WheelTicks) -> TickResult {
        let pose = match self.estimator.proc(ticks) {
            Ok((pose, _)) => pose,
            Err(e) => match e {}
        };

        let result = self.ctrl.step();

        trace!("Cycle {}: {:?} -> {:?}", self.num_cycles, ticks, result);

        self.last_record = CycleRecord::new(
            self.num_cycles,
            ticks,
            &pose,
            &result,
            &self.ctrl.report()
        );
        self.num_cycles += 1;

        result
    }

    /// Take the tick increments from the given source and run one cycle.
    pub fn cycle_from<E: EncoderSource>(&mut self, encoders: &mut E) -> TickResult {
        let ticks = encoders.take_deltas();
        self.cycle(&ticks)
    }

    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }

    pub fn estimator(&self) -> &PoseEstimator {
        &self.estimator
    }

    pub fn estimator_mut(&mut self) -> &mut PoseEstimator {
        &mut self.estimator
    }

    pub fn ctrl(&self) -> &WaypointCtrl {
        &self.ctrl
    }

    pub fn ctrl_mut(&mut self) -> &mut WaypointCtrl {
        &mut self.ctrl
    }

    /// The record of the last cycle.
    pub fn last_record(&self) -> &CycleRecord {
        &self.last_record
    }
}

impl Archived for NavDriver {
    /// Write the last cycle's record, if an archiver has been set.
    fn write(&mut self) -> Result<(), ArchiveError> {
        match self.arch {
            Some(ref mut a) => a.serialise(self.last_record),
            None => Ok(())
        }
    }
}

impl CycleRecord {
    pub fn new(
        cycle: u64,
        ticks: &WheelTicks,
        pose: &Pose,
        result: &TickResult,
        report: &StatusReport
    ) -> Self {
        let speeds = result.wheel_speeds();

        Self {
            cycle,
            left_ticks: ticks.left,
            right_ticks: ticks.right,
            x_mm: pose.x_mm(),
            y_mm: pose.y_mm(),
            heading_deg: pose.heading_deg(),
            branch: report.branch,
            target_index: report.current_index,
            distance_mm: report.distance_mm,
            angle_diff_deg: report.angle_diff_deg,
            lat_error_norm: report.lat_error_norm,
            correction: report.correction,
            left_speed: speeds.map(|s| s.0),
            right_speed: speeds.map(|s| s.1),
            reached_index: match result {
                TickResult::WaypointReached(i) => Some(*i),
                _ => None
            },
            route_completed: *result == TickResult::RouteCompleted
        }
    }
}
