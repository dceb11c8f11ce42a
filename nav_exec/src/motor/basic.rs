//! Four-primitive motor adapter

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::{MotorPrimitives, MotorSink};
use crate::wp_ctrl::{DriveCmd, SpeedBound, TurnDir};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives `MotorPrimitives` from `DriveCmd`s.
///
/// Differential commands have no direct primitive, so one is derived from
/// the pair of wheel speeds:
///
/// - both wheels forward: drive forward at the slower wheel's speed,
/// - left faster than right: turn right at the difference,
/// - right faster than left: turn left at the difference,
/// - anything else: stop.
#[derive(Debug)]
pub struct BasicMotors<M> {
    motors: M
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<M: MotorPrimitives> BasicMotors<M> {
    pub fn new(motors: M) -> Self {
        Self { motors }
    }

    /// Get a reference to the wrapped motors.
    pub fn motors(&self) -> &M {
        &self.motors
    }

    fn differential(&mut self, left: f64, right: f64) {
        if left > 0.0 && right > 0.0 {
            self.motors.forward(left.min(right));
        }
        else if left > right {
            self.motors.turn_right(left - right);
        }
        else if right > left {
            self.motors.turn_left(right - left);
        }
        else {
            self.motors.stop();
        }
    }
}

impl<M: MotorPrimitives> MotorSink for BasicMotors<M> {
    fn speed_bound(&self) -> SpeedBound {
        SpeedBound::Unsigned
    }

    fn execute(&mut self, cmd: &DriveCmd) {
        trace!("BasicMotors executing {:?}", cmd);

        match *cmd {
            DriveCmd::Forward { speed } => self.motors.forward(speed),
            DriveCmd::PointTurn { dir: TurnDir::Left, speed } => self.motors.turn_left(speed),
            DriveCmd::PointTurn { dir: TurnDir::Right, speed } => self.motors.turn_right(speed),
            DriveCmd::Differential { left, right } => self.differential(left, right),
            DriveCmd::Stop => self.motors.stop()
        }
    }

    fn stop(&mut self) {
        trace!("BasicMotors stopping");
        self.motors.stop();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::motor::test::{Call, RecordingMotors};

    fn run(cmd: DriveCmd) -> Vec<Call> {
        let motors = RecordingMotors::default();
        let mut sink = BasicMotors::new(motors.clone());
        sink.execute(&cmd);
        motors.calls()
    }

    #[test]
    fn test_primitives() {
        assert_eq!(run(DriveCmd::Forward { speed: 40.0 }), vec![Call::Forward(40.0)]);
        assert_eq!(
            run(DriveCmd::PointTurn { dir: TurnDir::Left, speed: 20.0 }),
            vec![Call::TurnLeft(20.0)]
        );
        assert_eq!(
            run(DriveCmd::PointTurn { dir: TurnDir::Right, speed: 25.0 }),
            vec![Call::TurnRight(25.0)]
        );
        assert_eq!(run(DriveCmd::Stop), vec![Call::Stop]);
    }

    #[test]
    fn test_differential_derivation() {
        assert_eq!(
            run(DriveCmd::Differential { left: 60.0, right: 40.0 }),
            vec![Call::Forward(40.0)]
        );
        assert_eq!(
            run(DriveCmd::Differential { left: 30.0, right: 0.0 }),
            vec![Call::TurnRight(30.0)]
        );
        assert_eq!(
            run(DriveCmd::Differential { left: 0.0, right: 30.0 }),
            vec![Call::TurnLeft(30.0)]
        );
        assert_eq!(
            run(DriveCmd::Differential { left: 0.0, right: 0.0 }),
            vec![Call::Stop]
        );
    }

    #[test]
    fn test_stop_and_bound() {
        let motors = RecordingMotors::default();
        let mut sink = BasicMotors::new(motors.clone());

        assert_eq!(sink.speed_bound(), SpeedBound::Unsigned);
        MotorSink::stop(&mut sink);
        assert_eq!(motors.calls(), vec![Call::Stop]);
    }
}
