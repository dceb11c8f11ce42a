//! # Simulation Client
//!
//! The SimClient provides a simulated differential-drive vehicle to the
//! navigation software. It is to be used for testing and development rather
//! than actual driving of a vehicle. The client provides:
//!
//! - Motors, which accept either differential speeds or the four motor
//!   primitives - `SimMotors`.
//! - Wheel encoders, which accumulate whole ticks between reads -
//!   `SimEncoders`.
//! - The true pose of the vehicle, for comparison against the estimate.
//!
//! The motors, encoders and client all share a single simulated vehicle, so
//! they can be handed out to different owners (the controller's motor sink
//! and the driver's encoder source) while still acting on the same plant.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

// Internal
use crate::driver::EncoderSource;
use crate::loc::{integrate_arc, Pose, WheelTicks};
use crate::motor::{DifferentialDrive, MotorPrimitives};
use crate::wp_ctrl::MAX_SPEED;
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the simulated vehicle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Wheel surface speed at 100% demand.
    ///
    /// Units: millimetres/second
    pub max_wheel_speed_mms: f64,

    /// Units: millimetres
    pub track_width_mm: f64,

    /// Units: ticks/metre
    pub ticks_per_m: f64
}

/// Handle to a simulated vehicle.
#[derive(Debug, Clone)]
pub struct SimClient {
    vehicle: Rc<RefCell<SimVehicle>>
}

/// Motors of a simulated vehicle.
#[derive(Debug, Clone)]
pub struct SimMotors {
    vehicle: Rc<RefCell<SimVehicle>>
}

/// Encoders of a simulated vehicle.
#[derive(Debug, Clone)]
pub struct SimEncoders {
    vehicle: Rc<RefCell<SimVehicle>>
}

#[derive(Debug)]
struct SimVehicle {
    params: SimParams,

    /// True pose of the vehicle
    pose: Pose,

    /// Current wheel speed demands
    ///
    /// Units: percent
    left_speed: f64,
    right_speed: f64,

    /// Fractional ticks not yet reported
    left_carry: f64,
    right_carry: f64,

    /// Whole ticks accumulated since the encoders were last read
    pending: WheelTicks
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            max_wheel_speed_mms: 200.0,
            track_width_mm: 170.0,
            ticks_per_m: 1000.0
        }
    }
}

impl SimClient {

    /// Create a new simulated vehicle at the origin, facing +X.
    pub fn new(params: SimParams) -> Self {
        Self {
            vehicle: Rc::new(RefCell::new(SimVehicle {
                params,
                pose: Pose::default(),
                left_speed: 0.0,
                right_speed: 0.0,
                left_carry: 0.0,
                right_carry: 0.0,
                pending: WheelTicks::default()
            }))
        }
    }

    /// Get the vehicle's motors.
    pub fn motors(&self) -> SimMotors {
        SimMotors {
            vehicle: self.vehicle.clone()
        }
    }

    /// Get the vehicle's encoders.
    pub fn encoders(&self) -> SimEncoders {
        SimEncoders {
            vehicle: self.vehicle.clone()
        }
    }

    /// Advance the simulation by `dt_s` seconds at the current wheel speeds.
    pub fn step(&self, dt_s: f64) {
        self.vehicle.borrow_mut().step(dt_s);
    }

    /// The true pose of the vehicle.
    pub fn true_pose(&self) -> Pose {
        self.vehicle.borrow().pose
    }

    /// The current `(left, right)` wheel speed demands in percent.
    pub fn wheel_speeds(&self) -> (f64, f64) {
        let v = self.vehicle.borrow();
        (v.left_speed, v.right_speed)
    }
}

impl SimVehicle {
    fn set_speeds(&mut self, left: f64, right: f64) {
        self.left_speed = left;
        self.right_speed = right;
    }

    fn step(&mut self, dt_s: f64) {
        let speed_range = (-MAX_SPEED, MAX_SPEED);
        let mms_range = (
            -self.params.max_wheel_speed_mms,
            self.params.max_wheel_speed_mms
        );

        let left_mm = lin_map(speed_range, mms_range, self.left_speed) * dt_s;
        let right_mm = lin_map(speed_range, mms_range, self.right_speed) * dt_s;

        let (pose, _) = integrate_arc(
            &self.pose,
            left_mm,
            right_mm,
            self.params.track_width_mm
        );
        self.pose = pose;

        // Quantise into whole ticks, carrying the remainder
        let ticks_per_mm = self.params.ticks_per_m / 1000.0;

        let left_ticks = left_mm * ticks_per_mm + self.left_carry;
        let right_ticks = right_mm * ticks_per_mm + self.right_carry;

        self.left_carry = left_ticks.fract();
        self.right_carry = right_ticks.fract();

        self.pending.left += left_ticks.trunc() as i32;
        self.pending.right += right_ticks.trunc() as i32;

        trace!(
            "Sim step: ({:.2}, {:.2}) mm, pose ({:.1}, {:.1}, {:.3})",
            left_mm, right_mm, self.pose.x_mm(), self.pose.y_mm(), self.pose.heading_rad
        );
    }
}

impl DifferentialDrive for SimMotors {
    fn set_speeds(&mut self, left: f64, right: f64) {
        self.vehicle.borrow_mut().set_speeds(left, right);
    }
}

impl MotorPrimitives for SimMotors {
    fn forward(&mut self, speed: f64) {
        self.vehicle.borrow_mut().set_speeds(speed, speed);
    }

    fn turn_left(&mut self, speed: f64) {
        self.vehicle.borrow_mut().set_speeds(-speed, speed);
    }

    fn turn_right(&mut self, speed: f64) {
        self.vehicle.borrow_mut().set_speeds(speed, -speed);
    }

    fn stop(&mut self) {
        self.vehicle.borrow_mut().set_speeds(0.0, 0.0);
    }
}

impl EncoderSource for SimEncoders {
    fn take_deltas(&mut self) -> WheelTicks {
        std::mem::take(&mut self.vehicle.borrow_mut().pending)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_drive_straight() {
        let sim = SimClient::new(SimParams::default());
        let mut motors = sim.motors();
        let mut enc = sim.encoders();

        // 50% of 200 mm/s for 1 s is 100 mm
        MotorPrimitives::forward(&mut motors, 50.0);
        for _ in 0..20 {
            sim.step(0.05);
        }

        assert_abs_diff_eq!(sim.true_pose().x_mm(), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sim.true_pose().y_mm(), 0.0, epsilon = 1e-9);

        let ticks = enc.take_deltas();
        assert!((ticks.left - 100).abs() <= 1);
        assert_eq!(ticks.left, ticks.right);
        assert_eq!(enc.take_deltas(), WheelTicks::default());
    }

    #[test]
    fn test_fractional_ticks_carried() {
        let sim = SimClient::new(SimParams::default());
        let mut motors = sim.motors();
        let mut enc = sim.encoders();

        // 0.25 mm per step, so one tick every 4 steps
        motors.set_speeds(2.5, 2.5);
        let mut total = 0;
        for _ in 0..40 {
            sim.step(0.05);
            total += enc.take_deltas().left;
        }

        assert!((total - 10).abs() <= 1);
    }

    #[test]
    fn test_turn_right_is_clockwise() {
        let sim = SimClient::new(SimParams::default());
        let mut motors = sim.motors();

        motors.turn_right(50.0);
        sim.step(0.05);

        assert!(sim.true_pose().heading_rad < 0.0);
        assert_eq!(sim.wheel_speeds(), (50.0, -50.0));

        MotorPrimitives::stop(&mut motors);
        assert_eq!(sim.wheel_speeds(), (0.0, 0.0));
    }
}
