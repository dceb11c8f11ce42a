//! # Motor module
//!
//! Waypoint control emits `DriveCmd`s into a `MotorSink`. Two flavours of
//! motor hardware are supported, each through its own adapter:
//!
//! - `BasicMotors` drives hardware which only understands four primitives
//!   (forward, turn left, turn right, stop) with speeds in [0, 100].
//! - `DifferentialMotors` drives hardware which accepts independent signed
//!   wheel speeds in [-100, 100].
//!
//! The adapter's `SpeedBound` is what the controller saturates its wheel
//! speeds into.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod basic;
mod differential;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
pub use basic::BasicMotors;
pub use differential::DifferentialMotors;
use crate::wp_ctrl::{DriveCmd, SpeedBound};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Destination for the commands produced by waypoint control.
pub trait MotorSink {
    /// The range of wheel speeds this sink accepts.
    fn speed_bound(&self) -> SpeedBound;

    /// Execute the given command.
    fn execute(&mut self, cmd: &DriveCmd);

    /// Stop all motion.
    fn stop(&mut self);
}

/// Motors which can only perform a fixed set of manouvres.
///
/// All speeds are in percent, in [0, 100].
pub trait MotorPrimitives {
    fn forward(&mut self, speed: f64);

    fn turn_left(&mut self, speed: f64);

    fn turn_right(&mut self, speed: f64);

    fn stop(&mut self);
}

/// Motors with independently controlled left and right wheels.
///
/// Speeds are in percent, in [-100, 100], with negative values driving the
/// wheel backwards.
pub trait DifferentialDrive {
    fn set_speeds(&mut self, left: f64, right: f64);
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The kind of motor adapter to drive the vehicle through.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorKind {
    Basic,
    Differential
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotorKind {

    /// Build a sink of this kind around the given motors.
    pub fn sink<M>(self, motors: M) -> Box<dyn MotorSink>
    where
        M: MotorPrimitives + DifferentialDrive + 'static
    {
        match self {
            MotorKind::Basic => Box::new(BasicMotors::new(motors)),
            MotorKind::Differential => Box::new(DifferentialMotors::new(motors))
        }
    }
}

impl Default for MotorKind {
    fn default() -> Self {
        MotorKind::Differential
    }
}
