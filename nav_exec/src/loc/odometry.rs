//! Wheel odometry pose estimator
//!
//! Each update integrates a pair of wheel displacements as a circular arc.
//! When the two displacements are (almost) equal the motion is treated as a
//! straight line, which avoids dividing by a vanishing heading change.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;
use std::convert::Infallible;

// Internal
use super::{CalibrationParams, LocError, Pose, PoseHandle};
use util::{
    maths::{map_pi_to_2pi, norm_angle_pi},
    module::State,
    params
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Wheel displacement differences below this are integrated as a straight
/// line.
///
/// Units: millimetres
pub const STRAIGHT_THRESHOLD_MM: f64 = 1e-3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Dead-reckoning pose estimator driven by wheel displacements.
///
/// The estimator publishes its pose to a shared `PoseHandle` after every
/// mutation, so consumers holding the handle always see the latest pose.
#[derive(Debug, Default)]
pub struct PoseEstimator {
    calib: CalibrationParams,

    pose: Pose,

    handle: PoseHandle,

    report: OdomReport
}

/// Raw encoder tick increments for one cycle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WheelTicks {
    pub left: i32,
    pub right: i32
}

/// Status report for the last odometry update.
#[derive(Debug, Copy, Clone, Default, Serialize)]
pub struct OdomReport {
    /// Left wheel displacement used in the last update.
    pub left_mm: f64,

    /// Right wheel displacement used in the last update.
    pub right_mm: f64,

    /// True if the last update was integrated as an arc rather than a
    /// straight line.
    pub arc: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoseEstimator {

    /// Create a new estimator with the given calibration, positioned at the
    /// origin facing along +X.
    pub fn new(calib: CalibrationParams) -> Result<Self, LocError> {
        let mut est = Self::default();
        est.init(calib)?;
        Ok(est)
    }

    /// Create a new estimator with calibration loaded from the given
    /// parameter file.
    pub fn from_params(params_path: &str) -> Result<Self, LocError> {
        let calib: CalibrationParams = params::load(params_path)
            .map_err(LocError::ParamLoadError)?;

        Self::new(calib)
    }

    /// Set the calibration of the estimator and return the pose to the
    /// origin.
    ///
    /// If either value is not strictly positive an error is returned and
    /// both the calibration and pose are left untouched.
    pub fn initialize(
        &mut self,
        track_width_mm: f64,
        ticks_per_m: f64
    ) -> Result<(), LocError> {
        let calib = CalibrationParams {
            track_width_mm,
            ticks_per_m
        };
        calib.validate()?;

        self.calib = calib;
        self.reset();

        Ok(())
    }

    /// Get the current calibration.
    pub fn calibration(&self) -> CalibrationParams {
        self.calib
    }

    /// Return the pose to the origin, facing along +X.
    pub fn reset(&mut self) {
        self.pose = Pose::default();
        self.publish();
    }

    /// Overwrite the pose. The heading is normalised into (-pi, pi].
    pub fn set_pose(&mut self, x_mm: f64, y_mm: f64, heading_rad: f64) {
        self.pose = Pose::new(x_mm, y_mm, heading_rad);
        self.publish();
    }

    /// Integrate the given wheel displacements into the pose.
    pub fn update_from_distance(&mut self, left_mm: f64, right_mm: f64) {
        let (pose, arc) = integrate_arc(
            &self.pose,
            left_mm,
            right_mm,
            self.calib.track_width_mm
        );

        self.pose = pose;
        self.report = OdomReport {
            left_mm,
            right_mm,
            arc
        };

        self.publish();
    }

    /// Convert the encoder ticks into displacements and integrate them.
    pub fn update_from_ticks(&mut self, left_ticks: i32, right_ticks: i32) {
        let left_mm = self.calib.ticks_to_mm(left_ticks);
        let right_mm = self.calib.ticks_to_mm(right_ticks);

        self.update_from_distance(left_mm, right_mm);
    }

    /// Get the current pose estimate.
    pub fn get_pose(&self) -> Pose {
        self.pose
    }

    /// Get the report from the last update.
    pub fn report(&self) -> OdomReport {
        self.report
    }

    /// Get a handle which always reads the latest published pose.
    pub fn pose_handle(&self) -> PoseHandle {
        self.handle.clone()
    }

    /// Euclidean distance from the current position to the given point.
    pub fn distance_to(&self, x_mm: f64, y_mm: f64) -> f64 {
        self.pose.distance_to(&Vector2::new(x_mm, y_mm))
    }

    /// Bearing of the given point relative to the current heading, in
    /// radians in the range (-pi, pi]. Positive bearings lie to the left.
    pub fn bearing_to(&self, x_mm: f64, y_mm: f64) -> f64 {
        let delta_mm = Vector2::new(x_mm, y_mm) - self.pose.position_mm;

        norm_angle_pi(delta_mm[1].atan2(delta_mm[0]) - self.pose.heading_rad)
    }

    fn publish(&self) {
        self.handle.publish(self.pose);
    }
}

impl State for PoseEstimator {
    type InitData = CalibrationParams;
    type InitError = LocError;

    type InputData = WheelTicks;
    type OutputData = Pose;
    type StatusReport = OdomReport;
    type ProcError = Infallible;

    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.initialize(init_data.track_width_mm, init_data.ticks_per_m)
    }

    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.update_from_ticks(input_data.left, input_data.right);

        Ok((self.pose, self.report))
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Integrate a pair of wheel displacements from the given pose.
///
/// Returns the new pose and whether the motion was treated as an arc.
pub fn integrate_arc(
    pose: &Pose,
    left_mm: f64,
    right_mm: f64,
    track_width_mm: f64
) -> (Pose, bool) {
    let dist_mm = (left_mm + right_mm) / 2.0;
    let diff_mm = right_mm - left_mm;
    let heading_rad = pose.heading_rad;

    if diff_mm.abs() < STRAIGHT_THRESHOLD_MM {
        let position_mm = pose.position_mm + Vector2::new(
            dist_mm * heading_rad.cos(),
            dist_mm * heading_rad.sin()
        );

        (Pose { position_mm, heading_rad }, false)
    }
    else {
        let delta_heading_rad = diff_mm / track_width_mm;
        let radius_mm = dist_mm / delta_heading_rad;
        let new_heading_rad = heading_rad + delta_heading_rad;

        let position_mm = pose.position_mm + Vector2::new(
            radius_mm * (new_heading_rad.sin() - heading_rad.sin()),
            radius_mm * (heading_rad.cos() - new_heading_rad.cos())
        );

        (
            Pose {
                position_mm,
                heading_rad: norm_angle_pi(new_heading_rad)
            },
            true
        )
    }
}

/// Bearing from the pose's position to the target, in degrees measured from
/// +X in the range [0, 360).
pub fn bearing_deg(pose: &Pose, target_mm: &Vector2<f64>) -> f64 {
    let delta_mm = target_mm - pose.position_mm;

    map_pi_to_2pi(delta_mm[1].atan2(delta_mm[0])).to_degrees()
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn estimator(track_width_mm: f64) -> PoseEstimator {
        PoseEstimator::new(CalibrationParams {
            track_width_mm,
            ticks_per_m: 1000.0
        }).unwrap()
    }

    #[test]
    fn test_straight_line() {
        let mut est = estimator(100.0);
        est.update_from_distance(50.0, 50.0);

        let p = est.get_pose();
        assert_eq!(p.x_mm(), 50.0);
        assert_eq!(p.y_mm(), 0.0);
        assert_eq!(p.heading_rad, 0.0);
        assert!(!est.report().arc);
    }

    #[test]
    fn test_below_threshold_is_straight() {
        let mut est = estimator(100.0);
        est.update_from_distance(10.0, 10.0005);
        assert!(!est.report().arc);
        assert_eq!(est.get_pose().heading_rad, 0.0);
    }

    #[test]
    fn test_pure_rotation() {
        let mut est = estimator(100.0);
        est.update_from_distance(-10.0, 10.0);

        let p = est.get_pose();
        assert_abs_diff_eq!(p.heading_rad, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(p.x_mm(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y_mm(), 0.0, epsilon = 1e-12);

        // Spin through more than half a turn, heading must wrap
        let mut est = estimator(100.0);
        est.update_from_distance(-200.0, 200.0);
        assert_abs_diff_eq!(
            est.get_pose().heading_rad,
            norm_angle_pi(4.0),
            epsilon = 1e-12
        );
        assert!(est.get_pose().heading_rad <= PI);
    }

    #[test]
    fn test_arc() {
        let mut est = estimator(100.0);
        est.update_from_distance(90.0, 110.0);

        let p = est.get_pose();
        assert!(est.report().arc);
        assert_abs_diff_eq!(p.heading_rad, 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(p.x_mm(), 500.0 * 0.2f64.sin(), epsilon = 1e-9);
        assert_abs_diff_eq!(p.y_mm(), 500.0 * (1.0 - 0.2f64.cos()), epsilon = 1e-9);
    }

    #[test]
    fn test_ticks() {
        let mut est = PoseEstimator::new(CalibrationParams {
            track_width_mm: 100.0,
            ticks_per_m: 2000.0
        }).unwrap();

        let (pose, report) = est.proc(&WheelTicks { left: 100, right: 100 })
            .unwrap();

        assert_eq!(report.left_mm, 50.0);
        assert_eq!(pose.x_mm(), 50.0);
    }

    #[test]
    fn test_initialize_rejects_bad_values() {
        let mut est = estimator(100.0);
        est.set_pose(1.0, 2.0, 0.5);

        assert!(matches!(
            est.initialize(0.0, 1000.0),
            Err(LocError::InvalidTrackWidth(_))
        ));
        assert!(matches!(
            est.initialize(100.0, -5.0),
            Err(LocError::InvalidTicksPerMetre(_))
        ));
        assert!(est.initialize(f64::NAN, 1000.0).is_err());

        assert_eq!(est.calibration().track_width_mm, 100.0);
        assert_eq!(est.get_pose(), Pose::new(1.0, 2.0, 0.5));

        est.initialize(200.0, 500.0).unwrap();
        assert_eq!(est.calibration().ticks_per_m, 500.0);
        assert_eq!(est.get_pose(), Pose::default());
    }

    #[test]
    fn test_reset_and_set_pose() {
        let mut est = estimator(100.0);
        est.set_pose(10.0, -5.0, 3.0 * PI / 2.0);
        assert_abs_diff_eq!(est.get_pose().heading_rad, -PI / 2.0, epsilon = 1e-12);

        est.reset();
        assert_eq!(est.get_pose(), Pose::default());
    }

    #[test]
    fn test_handle_follows_estimator() {
        use crate::loc::PoseSource;

        let mut est = estimator(100.0);
        let handle = est.pose_handle();

        est.update_from_distance(20.0, 20.0);
        assert_eq!(handle.pose().x_mm(), 20.0);

        est.reset();
        assert_eq!(handle.pose(), Pose::default());
    }

    #[test]
    fn test_distance_and_bearing() {
        let mut est = estimator(100.0);
        assert_eq!(est.distance_to(30.0, 40.0), 50.0);
        assert_abs_diff_eq!(est.bearing_to(0.0, 10.0), PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(est.bearing_to(0.0, -10.0), -PI / 2.0, epsilon = 1e-12);
        assert_eq!(est.bearing_to(-10.0, 0.0), PI);

        est.set_pose(0.0, 0.0, PI / 2.0);
        assert_abs_diff_eq!(est.bearing_to(10.0, 0.0), -PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(est.bearing_to(-10.0, 0.0), PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bearing_deg() {
        let pose = Pose::new(10.0, 10.0, 1.0);
        assert_abs_diff_eq!(bearing_deg(&pose, &Vector2::new(10.0, 20.0)), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bearing_deg(&pose, &Vector2::new(10.0, 0.0)), 270.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bearing_deg(&pose, &Vector2::new(0.0, 10.0)), 180.0, epsilon = 1e-9);
    }
}
