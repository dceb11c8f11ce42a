//! Waypoint control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use nalgebra::Vector2;
use serde::Serialize;
use std::convert::Infallible;

// Internal
use super::*;
use crate::loc::{bearing_deg, Pose, PoseSource};
use crate::motor::MotorSink;
use util::{
    maths::norm_ang_diff_deg,
    module::State,
    params as util_params
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The waypoint controller.
#[derive(Default)]
pub struct WaypointCtrl {
    params: Params,

    /// Executing mode
    mode: NavMode,

    /// The waypoints to visit and the current target
    route: Route,

    /// Normalised lateral error from the previous correction tick, used for
    /// the derivative term
    last_lateral_error: f64,

    /// The pose source and motor sink
    link: Link,

    report: StatusReport
}

/// The status report containing the quantities computed in the last tick.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// The branch taken
    pub branch: Branch,

    /// Index of the target waypoint at the start of the tick
    pub current_index: usize,

    /// Distance to the target waypoint
    ///
    /// Units: millimetres
    pub distance_mm: f64,

    /// Bearing to the target from +X
    ///
    /// Units: degrees, in [0, 360)
    pub target_bearing_deg: f64,

    /// Difference between the target bearing and the heading
    ///
    /// Units: degrees, in [-180, 180]
    pub angle_diff_deg: f64,

    /// Lateral error normalised by the distance to the target
    pub lat_error_norm: f64,

    /// Correction before saturation
    pub raw_correction: f64,

    /// Correction after saturation
    pub correction: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Navigation mode of the controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum NavMode {
    Idle,
    Active
}

/// The branch selected by a tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Branch {
    Idle,
    Reached,
    Correction,
    RotateInPlace,
    Straight
}

/// The controller's collaborators.
///
/// Navigation can only start once the link is `Ready`.
enum Link {
    Unconfigured {
        pose_source: Option<Box<dyn PoseSource>>,
        motor_sink: Option<Box<dyn MotorSink>>
    },
    Ready {
        pose_source: Box<dyn PoseSource>,
        motor_sink: Box<dyn MotorSink>
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for WaypointCtrl {
    type InitData = Params;
    type InitError = WpCtrlError;

    type InputData = Pose;
    type OutputData = TickResult;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    /// Apply the given parameters through the setters.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.set_speed(init_data.speed);
        self.set_position_tolerance(init_data.position_tolerance_mm);
        self.set_angle_tolerance(init_data.angle_tolerance_deg);
        self.set_correction_gain(init_data.correction_gain);
        self.set_max_correction(init_data.max_correction);
        self.set_loop_mode(init_data.loop_mode);

        if init_data.correction_enabled {
            self.enable_correction();
        }
        else {
            self.disable_correction();
        }

        Ok(())
    }

    /// Tick with the given pose and forward the result to the motor sink.
    ///
    /// Commands are executed, reaching a waypoint stops the motors and a
    /// `NoOp` leaves the motors holding their previous command.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let result = self.tick(input_data);

        if let Some(sink) = self.link.motor_sink_mut() {
            match result {
                TickResult::Commanded(ref cmd) => sink.execute(cmd),
                TickResult::WaypointReached(_)
                | TickResult::RouteCompleted => sink.stop(),
                TickResult::NoOp => ()
            }
        }

        Ok((result, self.report))
    }
}

impl WaypointCtrl {

    /// Create a new controller with default parameters and no
    /// collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new controller with parameters loaded from the given file.
    pub fn from_params(params_path: &str) -> Result<Self, WpCtrlError> {
        let params: Params = util_params::load(params_path)
            .map_err(WpCtrlError::ParamLoadError)?;

        let mut ctrl = Self::new();
        ctrl.init(params)?;

        Ok(ctrl)
    }

    // ---- COLLABORATORS ----

    /// Set the source the controller reads the pose from, replacing any
    /// previous source.
    pub fn set_pose_source<S>(&mut self, source: S)
    where
        S: PoseSource + 'static
    {
        self.link = self.link.take().with_pose_source(Box::new(source));
    }

    /// Set the sink the controller commands, replacing any previous sink.
    pub fn set_motor_sink<M>(&mut self, sink: M)
    where
        M: MotorSink + 'static
    {
        self.link = self.link.take().with_motor_sink(Box::new(sink));
    }

    /// Set an already boxed pose source.
    pub fn set_boxed_pose_source(&mut self, source: Box<dyn PoseSource>) {
        self.link = self.link.take().with_pose_source(source);
    }

    /// Set an already boxed motor sink.
    pub fn set_boxed_motor_sink(&mut self, sink: Box<dyn MotorSink>) {
        self.link = self.link.take().with_motor_sink(sink);
    }

    /// True if both a pose source and a motor sink are configured.
    pub fn is_ready(&self) -> bool {
        matches!(self.link, Link::Ready { .. })
    }

    // ---- ROUTE ----

    /// Append a waypoint to the route. This is allowed during navigation.
    pub fn add_waypoint(&mut self, x_mm: f64, y_mm: f64) {
        self.route.push(Waypoint::new(x_mm, y_mm));
        debug!("Waypoint {} added at ({}, {})", self.route.len() - 1, x_mm, y_mm);
    }

    /// Remove all waypoints. Navigation is not stopped, ticks will be no-ops
    /// until new waypoints are added.
    pub fn clear_waypoints(&mut self) {
        self.route.clear();
        debug!("Waypoints cleared");
    }

    // ---- START/STOP ----

    /// Begin navigating from the first waypoint.
    ///
    /// Fails without changing anything if a collaborator is missing or the
    /// route is empty.
    pub fn start(&mut self) -> Result<(), WpCtrlError> {
        match self.link {
            Link::Unconfigured { pose_source: None, .. } =>
                return Err(WpCtrlError::NoPoseSource),
            Link::Unconfigured { motor_sink: None, .. } =>
                return Err(WpCtrlError::NoMotorSink),
            _ => ()
        }

        if self.route.is_empty() {
            return Err(WpCtrlError::EmptyRoute)
        }

        self.route.rewind();
        self.last_lateral_error = 0.0;
        self.mode = NavMode::Active;

        info!("Navigation started with {} waypoints", self.route.len());

        Ok(())
    }

    /// Stop navigating and stop the motors.
    pub fn stop(&mut self) {
        self.mode = NavMode::Idle;

        if let Some(sink) = self.link.motor_sink_mut() {
            sink.stop();
        }

        info!("Navigation stopped");
    }

    // ---- PARAMETERS ----

    /// Set the nominal speed, clamped into [0, 100].
    pub fn set_speed(&mut self, speed: f64) {
        self.params.speed = speed.max(0.0).min(MAX_SPEED);
    }

    pub fn set_position_tolerance(&mut self, tolerance_mm: f64) {
        self.params.position_tolerance_mm = tolerance_mm;
    }

    pub fn set_angle_tolerance(&mut self, tolerance_deg: f64) {
        self.params.angle_tolerance_deg = tolerance_deg;
    }

    /// Set the correction gain, clamped into [0, 1].
    pub fn set_correction_gain(&mut self, gain: f64) {
        self.params.correction_gain = gain.max(0.0).min(1.0);
    }

    pub fn set_max_correction(&mut self, max_correction: f64) {
        self.params.max_correction = max_correction;
    }

    pub fn set_loop_mode(&mut self, loop_mode: LoopMode) {
        self.params.loop_mode = loop_mode;
    }

    pub fn enable_correction(&mut self) {
        self.params.correction_enabled = true;
    }

    pub fn disable_correction(&mut self) {
        self.params.correction_enabled = false;
    }

    // ---- QUERIES ----

    pub fn mode(&self) -> NavMode {
        self.mode
    }

    pub fn current_index(&self) -> usize {
        self.route.current_index()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn last_lateral_error(&self) -> f64 {
        self.last_lateral_error
    }

    /// The report from the last tick.
    pub fn report(&self) -> StatusReport {
        self.report
    }

    // ---- CYCLIC PROCESSING ----

    /// Read the pose from the configured source, then tick and forward the
    /// result to the motor sink.
    ///
    /// If no pose source is configured this is a no-op.
    pub fn step(&mut self) -> TickResult {
        let pose = match self.link.pose_source() {
            Some(s) => s.pose(),
            None => return TickResult::NoOp
        };

        match self.proc(&pose) {
            Ok((result, _)) => result,
            Err(e) => match e {}
        }
    }

    /// Compute the motor command for the given pose.
    ///
    /// This does not command the motor sink, see `proc` and `step`.
    pub fn tick(&mut self, pose: &Pose) -> TickResult {
        self.report = StatusReport {
            current_index: self.route.current_index(),
            ..Default::default()
        };

        // Mode execution
        match self.mode {
            NavMode::Idle => TickResult::NoOp,
            NavMode::Active => self.mode_active(pose)
        }
    }

    fn mode_active(&mut self, pose: &Pose) -> TickResult {
        let target_mm = match self.route.current() {
            Some(wp) => wp.position(),
            None => {
                debug!("No waypoints to navigate to, holding");
                return TickResult::NoOp
            }
        };

        let delta_mm = target_mm - pose.position_mm;
        let distance_mm = delta_mm.norm();
        self.report.distance_mm = distance_mm;

        if distance_mm <= self.params.position_tolerance_mm {
            self.report.branch = Branch::Reached;
            return self.waypoint_reached()
        }

        let target_bearing_deg = bearing_deg(pose, &target_mm);
        let angle_diff_deg = norm_ang_diff_deg(
            target_bearing_deg - pose.heading_deg()
        );
        self.report.target_bearing_deg = target_bearing_deg;
        self.report.angle_diff_deg = angle_diff_deg;

        let cmd = if self.params.correction_enabled
            && angle_diff_deg.abs() <= CORRECTION_WINDOW_DEG
        {
            self.report.branch = Branch::Correction;
            self.correct(pose, &delta_mm, distance_mm)
        }
        else if angle_diff_deg.abs() > self.params.angle_tolerance_deg {
            self.report.branch = Branch::RotateInPlace;

            let dir = if angle_diff_deg > 0.0 {
                TurnDir::Right
            }
            else {
                TurnDir::Left
            };

            DriveCmd::PointTurn {
                dir,
                speed: self.params.speed.min(angle_diff_deg.abs())
            }
        }
        else {
            self.report.branch = Branch::Straight;
            DriveCmd::Forward { speed: self.params.speed }
        };

        debug!(
            "WpCtrl {:?}: dist {:.1} mm, diff {:.1} deg, cmd {:?}",
            self.report.branch, distance_mm, angle_diff_deg, cmd
        );

        TickResult::Commanded(cmd)
    }

    /// Advance the route after the current waypoint has been reached.
    fn waypoint_reached(&mut self) -> TickResult {
        let reached_index = self.route.current_index();
        let wrapped = self.route.advance();

        if wrapped && self.route.len() > 1 && self.params.loop_mode == LoopMode::Once {
            self.mode = NavMode::Idle;
            info!("Waypoint {} reached, route completed", reached_index);
            TickResult::RouteCompleted
        }
        else {
            info!("Waypoint {} reached", reached_index);
            TickResult::WaypointReached(reached_index)
        }
    }

    /// Calculate the lateral error correction and the resulting wheel
    /// speeds.
    fn correct(
        &mut self,
        pose: &Pose,
        delta_mm: &Vector2<f64>,
        distance_mm: f64
    ) -> DriveCmd {
        let lat_error = delta_mm.dot(&pose.left2())
            / distance_mm.max(LAT_ERROR_MIN_DIST_MM);

        let raw_correction = lat_error * self.params.correction_gain * PROP_SCALE
            + (lat_error - self.last_lateral_error) * DERIV_COEFF;
        self.last_lateral_error = lat_error;

        let max = self.params.max_correction;
        let correction = raw_correction.max(-max).min(max);

        self.report.lat_error_norm = lat_error;
        self.report.raw_correction = raw_correction;
        self.report.correction = correction;

        let bound = self.speed_bound();

        DriveCmd::Differential {
            left: bound.clamp(self.params.speed + correction),
            right: bound.clamp(self.params.speed - correction)
        }
    }

    fn speed_bound(&self) -> SpeedBound {
        match self.link.motor_sink() {
            Some(s) => s.speed_bound(),
            None => {
                warn!("No motor sink to take a speed bound from, using unsigned");
                SpeedBound::Unsigned
            }
        }
    }
}

impl Default for NavMode {
    fn default() -> Self {
        NavMode::Idle
    }
}

impl Default for Branch {
    fn default() -> Self {
        Branch::Idle
    }
}

impl Default for Link {
    fn default() -> Self {
        Link::Unconfigured {
            pose_source: None,
            motor_sink: None
        }
    }
}

impl Link {

    /// Move the link out, leaving an unconfigured one in its place.
    fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    fn with_pose_source(self, pose_source: Box<dyn PoseSource>) -> Self {
        match self {
            Link::Unconfigured { motor_sink: Some(motor_sink), .. }
            | Link::Ready { motor_sink, .. } => Link::Ready {
                pose_source,
                motor_sink
            },
            Link::Unconfigured { motor_sink: None, .. } => Link::Unconfigured {
                pose_source: Some(pose_source),
                motor_sink: None
            }
        }
    }

    fn with_motor_sink(self, motor_sink: Box<dyn MotorSink>) -> Self {
        match self {
            Link::Unconfigured { pose_source: Some(pose_source), .. }
            | Link::Ready { pose_source, .. } => Link::Ready {
                pose_source,
                motor_sink
            },
            Link::Unconfigured { pose_source: None, .. } => Link::Unconfigured {
                pose_source: None,
                motor_sink: Some(motor_sink)
            }
        }
    }

    fn pose_source(&self) -> Option<&dyn PoseSource> {
        match self {
            Link::Unconfigured { pose_source, .. } => pose_source.as_deref(),
            Link::Ready { pose_source, .. } => Some(&**pose_source)
        }
    }

    fn motor_sink(&self) -> Option<&dyn MotorSink> {
        match self {
            Link::Unconfigured { motor_sink, .. } => motor_sink.as_deref(),
            Link::Ready { motor_sink, .. } => Some(&**motor_sink)
        }
    }

    fn motor_sink_mut(&mut self) -> Option<&mut Box<dyn MotorSink>> {
        match self {
            Link::Unconfigured { motor_sink, .. } => motor_sink.as_mut(),
            Link::Ready { motor_sink, .. } => Some(motor_sink)
        }
    }
}
