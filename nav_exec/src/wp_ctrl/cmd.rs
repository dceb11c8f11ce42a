//! Commands and results produced by waypoint control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum magnitude of any wheel speed.
///
/// Units: percent
pub const MAX_SPEED: f64 = 100.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command to the drive motors.
///
/// The command carries the intent of the manouvre rather than just a pair of
/// wheel speeds, so that motors which only understand a fixed set of
/// primitives can be driven without loss.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub enum DriveCmd {
    /// Drive both wheels forward at the same speed.
    Forward { speed: f64 },

    /// Turn on the spot.
    PointTurn { dir: TurnDir, speed: f64 },

    /// Drive each wheel at its own speed.
    Differential { left: f64, right: f64 },

    /// Stop both wheels.
    Stop
}

/// Direction of a point turn, as seen from above.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TurnDir {
    Left,
    Right
}

/// The outcome of a single controller tick.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub enum TickResult {
    /// Nothing to do, the previous motor command should be held.
    NoOp,

    /// A new motor command was produced.
    Commanded(DriveCmd),

    /// The waypoint at the given index was reached. Motors are stopped.
    WaypointReached(usize),

    /// The final waypoint was reached and the route will not be repeated.
    /// Motors are stopped.
    RouteCompleted
}

/// The range of speeds a motor sink accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBound {
    /// Speeds in [0, 100].
    Unsigned,

    /// Speeds in [-100, 100].
    Signed
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCmd {

    /// Get the `(left, right)` wheel speeds this command corresponds to.
    pub fn wheel_speeds(&self) -> (f64, f64) {
        match *self {
            DriveCmd::Forward { speed } => (speed, speed),
            DriveCmd::PointTurn { dir: TurnDir::Right, speed } => (speed, -speed),
            DriveCmd::PointTurn { dir: TurnDir::Left, speed } => (-speed, speed),
            DriveCmd::Differential { left, right } => (left, right),
            DriveCmd::Stop => (0.0, 0.0)
        }
    }
}

impl TickResult {

    /// Get the wheel speeds implied by this result, or `None` if the
    /// previous command should be held.
    pub fn wheel_speeds(&self) -> Option<(f64, f64)> {
        match self {
            TickResult::NoOp => None,
            TickResult::Commanded(cmd) => Some(cmd.wheel_speeds()),
            TickResult::WaypointReached(_)
            | TickResult::RouteCompleted => Some((0.0, 0.0))
        }
    }
}

impl SpeedBound {

    /// The lowest speed in this bound.
    pub fn min(&self) -> f64 {
        match self {
            SpeedBound::Unsigned => 0.0,
            SpeedBound::Signed => -MAX_SPEED
        }
    }

    /// The highest speed in this bound.
    pub fn max(&self) -> f64 {
        MAX_SPEED
    }

    /// Saturate the speed into this bound.
    pub fn clamp(&self, speed: f64) -> f64 {
        speed.max(self.min()).min(self.max())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wheel_speeds() {
        assert_eq!(DriveCmd::Forward { speed: 40.0 }.wheel_speeds(), (40.0, 40.0));
        assert_eq!(
            DriveCmd::PointTurn { dir: TurnDir::Right, speed: 30.0 }.wheel_speeds(),
            (30.0, -30.0)
        );
        assert_eq!(
            DriveCmd::PointTurn { dir: TurnDir::Left, speed: 30.0 }.wheel_speeds(),
            (-30.0, 30.0)
        );
        assert_eq!(DriveCmd::Stop.wheel_speeds(), (0.0, 0.0));

        assert_eq!(TickResult::NoOp.wheel_speeds(), None);
        assert_eq!(TickResult::WaypointReached(3).wheel_speeds(), Some((0.0, 0.0)));
        assert_eq!(TickResult::RouteCompleted.wheel_speeds(), Some((0.0, 0.0)));
        assert_eq!(
            TickResult::Commanded(DriveCmd::Differential { left: 10.0, right: 20.0 })
                .wheel_speeds(),
            Some((10.0, 20.0))
        );
    }

    #[test]
    fn test_speed_bound() {
        assert_eq!(SpeedBound::Unsigned.clamp(-20.0), 0.0);
        assert_eq!(SpeedBound::Unsigned.clamp(120.0), 100.0);
        assert_eq!(SpeedBound::Signed.clamp(-20.0), -20.0);
        assert_eq!(SpeedBound::Signed.clamp(-150.0), -100.0);
        assert_eq!(SpeedBound::Signed.clamp(55.5), 55.5);
    }
}
