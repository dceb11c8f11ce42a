//! Differential motor adapter

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::{DifferentialDrive, MotorSink};
use crate::wp_ctrl::{DriveCmd, SpeedBound};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives a `DifferentialDrive` from `DriveCmd`s by converting every command
/// into its pair of wheel speeds.
#[derive(Debug)]
pub struct DifferentialMotors<D> {
    drive: D
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D: DifferentialDrive> DifferentialMotors<D> {
    pub fn new(drive: D) -> Self {
        Self { drive }
    }

    /// Get a reference to the wrapped drive.
    pub fn drive(&self) -> &D {
        &self.drive
    }
}

impl<D: DifferentialDrive> MotorSink for DifferentialMotors<D> {
    fn speed_bound(&self) -> SpeedBound {
        SpeedBound::Signed
    }

    fn execute(&mut self, cmd: &DriveCmd) {
        let (left, right) = cmd.wheel_speeds();

        trace!("DifferentialMotors setting speeds ({:.2}, {:.2})", left, right);

        self.drive.set_speeds(left, right);
    }

    fn stop(&mut self) {
        trace!("DifferentialMotors stopping");
        self.drive.set_speeds(0.0, 0.0);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::motor::test::{Call, RecordingMotors};
    use crate::wp_ctrl::TurnDir;

    #[test]
    fn test_commands_become_speeds() {
        let motors = RecordingMotors::default();
        let mut sink = DifferentialMotors::new(motors.clone());

        sink.execute(&DriveCmd::Forward { speed: 50.0 });
        sink.execute(&DriveCmd::PointTurn { dir: TurnDir::Right, speed: 20.0 });
        sink.execute(&DriveCmd::Differential { left: -10.0, right: 35.0 });
        sink.execute(&DriveCmd::Stop);
        sink.stop();

        assert_eq!(motors.calls(), vec![
            Call::SetSpeeds(50.0, 50.0),
            Call::SetSpeeds(20.0, -20.0),
            Call::SetSpeeds(-10.0, 35.0),
            Call::SetSpeeds(0.0, 0.0),
            Call::SetSpeeds(0.0, 0.0)
        ]);
        assert_eq!(sink.speed_bound(), SpeedBound::Signed);
    }
}
