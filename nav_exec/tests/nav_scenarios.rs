//! End to end navigation scenarios, driving the simulated vehicle through
//! the estimator and controller.

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use nalgebra::Vector2;

use nav_lib::{
    driver::NavDriver,
    loc::{
        CalibrationParams, FnPoseSource, HeadingFrame, HeadingUnit, Mirrored,
        PoseEstimator, PoseSource, WheelTicks
    },
    motor::{BasicMotors, DifferentialDrive, DifferentialMotors, MotorKind},
    sim_client::{SimClient, SimParams},
    wp_ctrl::{DriveCmd, LoopMode, NavMode, Params, TickResult, WaypointCtrl}
};
use util::{archive::{Archived, Archiver}, module::State};

/// A differential drive which records the speeds it was set to.
#[derive(Clone, Default)]
struct SpeedRecorder(Rc<RefCell<Vec<(f64, f64)>>>);

impl DifferentialDrive for SpeedRecorder {
    fn set_speeds(&mut self, left: f64, right: f64) {
        self.0.borrow_mut().push((left, right));
    }
}

const SQUARE: [(f64, f64); 4] = [
    (1000.0, 0.0),
    (1000.0, 1000.0),
    (0.0, 1000.0),
    (0.0, 0.0)
];

fn scenario_params(correction_enabled: bool) -> Params {
    Params {
        speed: 50.0,
        position_tolerance_mm: 10.0,
        angle_tolerance_deg: 10.0,
        correction_gain: 0.5,
        max_correction: 30.0,
        correction_enabled,
        loop_mode: LoopMode::Forever
    }
}

fn scenario_driver(correction_enabled: bool, rec: &SpeedRecorder) -> NavDriver {
    let estimator = PoseEstimator::new(CalibrationParams {
        track_width_mm: 100.0,
        ticks_per_m: 200_000.0
    }).unwrap();

    let mut ctrl = WaypointCtrl::new();
    ctrl.init(scenario_params(correction_enabled)).unwrap();
    ctrl.set_pose_source(estimator.pose_handle());
    ctrl.set_motor_sink(DifferentialMotors::new(rec.clone()));
    ctrl.add_waypoint(1000.0, 0.0);
    ctrl.start().unwrap();

    NavDriver::new(estimator, ctrl)
}

/// Build a driver for a square route on a simulated vehicle.
fn sim_driver(sim: &SimClient, kind: MotorKind, correction_enabled: bool) -> NavDriver {
    let estimator = PoseEstimator::new(CalibrationParams::default()).unwrap();

    let mut ctrl = WaypointCtrl::new();
    ctrl.init(Params {
        loop_mode: LoopMode::Once,
        correction_enabled,
        ..Params::default()
    }).unwrap();
    ctrl.set_boxed_pose_source(HeadingFrame::Clockwise.wrap(estimator.pose_handle()));
    ctrl.set_boxed_motor_sink(kind.sink(sim.motors()));

    for (x, y) in SQUARE.iter() {
        ctrl.add_waypoint(*x, *y);
    }
    ctrl.start().unwrap();

    NavDriver::new(estimator, ctrl)
}

/// Run the driver until the route is completed, returning the waypoints
/// reached on the way.
fn run_to_completion(sim: &SimClient, driver: &mut NavDriver, max_cycles: u64) -> Vec<usize> {
    let mut encoders = sim.encoders();
    let mut reached = Vec::new();

    while driver.num_cycles() < max_cycles {
        sim.step(nav_lib::driver::CYCLE_PERIOD_S);

        match driver.cycle_from(&mut encoders) {
            TickResult::WaypointReached(i) => reached.push(i),
            TickResult::RouteCompleted => return reached,
            _ => ()
        }
    }

    panic!(
        "Route not completed in {} cycles, reached {:?}, pose {:?}",
        max_cycles, reached, driver.estimator().get_pose()
    );
}

#[test]
fn test_first_tick_forward_without_correction() {
    let rec = SpeedRecorder::default();
    let mut driver = scenario_driver(false, &rec);

    let result = driver.cycle(&WheelTicks::default());

    assert_eq!(result, TickResult::Commanded(DriveCmd::Forward { speed: 50.0 }));
    assert_eq!(result.wheel_speeds(), Some((50.0, 50.0)));
    assert_eq!(*rec.0.borrow(), vec![(50.0, 50.0)]);
}

#[test]
fn test_first_tick_correction_matches_forward() {
    let rec = SpeedRecorder::default();
    let mut driver = scenario_driver(true, &rec);

    let result = driver.cycle(&WheelTicks::default());

    assert_eq!(
        result,
        TickResult::Commanded(DriveCmd::Differential { left: 50.0, right: 50.0 })
    );
    assert_eq!(driver.ctrl().last_lateral_error(), 0.0);
    assert_eq!(*rec.0.borrow(), vec![(50.0, 50.0)]);
}

#[test]
fn test_sim_square_differential() {
    let sim = SimClient::new(SimParams::default());
    let mut driver = sim_driver(&sim, MotorKind::Differential, true);

    let reached = run_to_completion(&sim, &mut driver, 5000);

    assert_eq!(reached, vec![0, 1, 2]);
    assert_eq!(driver.ctrl().mode(), NavMode::Idle);
    assert_eq!(driver.ctrl().current_index(), 0);

    // The final waypoint is the origin, which is the same in either frame
    let est = driver.estimator().get_pose();
    assert!(est.distance_to(&Vector2::zeros()) <= 10.0);

    // Odometry only drifts by the tick quantisation
    let truth = sim.true_pose();
    assert!(est.distance_to(&truth.position_mm) < 100.0);
    assert_eq!(sim.wheel_speeds(), (0.0, 0.0));
}

#[test]
fn test_sim_square_basic_motors() {
    let sim = SimClient::new(SimParams::default());
    let mut driver = sim_driver(&sim, MotorKind::Basic, false);

    let reached = run_to_completion(&sim, &mut driver, 8000);

    assert_eq!(reached, vec![0, 1, 2]);
    assert!(driver.estimator().get_pose().distance_to(&Vector2::zeros()) <= 10.0);
}

#[test]
fn test_ground_truth_pose_source() {
    let sim = SimClient::new(SimParams::default());

    let (sx, sy, sh) = (sim.clone(), sim.clone(), sim.clone());
    let truth = FnPoseSource::new(
        move || sx.true_pose().x_mm(),
        move || sy.true_pose().y_mm(),
        move || sh.true_pose().heading_deg(),
        HeadingUnit::Degrees
    );

    let mut ctrl = WaypointCtrl::new();
    ctrl.disable_correction();
    ctrl.set_pose_source(Mirrored(truth));
    ctrl.set_motor_sink(BasicMotors::new(sim.motors()));
    ctrl.add_waypoint(300.0, 300.0);
    ctrl.start().unwrap();

    let mut reached = false;
    for _ in 0..2000 {
        sim.step(0.05);
        if ctrl.step() == TickResult::WaypointReached(0) {
            reached = true;
            break
        }
    }

    assert!(reached);

    // The controller steers in the mirrored frame
    let p = sim.true_pose();
    assert!(Vector2::new(p.x_mm(), -p.y_mm()).metric_distance(&Vector2::new(300.0, 300.0)) <= 10.0);
}

#[test]
fn test_stop_halts_vehicle() {
    let sim = SimClient::new(SimParams::default());
    let mut driver = sim_driver(&sim, MotorKind::Differential, true);
    let mut encoders = sim.encoders();

    for _ in 0..10 {
        sim.step(0.05);
        driver.cycle_from(&mut encoders);
    }
    assert_ne!(sim.wheel_speeds(), (0.0, 0.0));

    driver.ctrl_mut().stop();
    assert_eq!(sim.wheel_speeds(), (0.0, 0.0));

    // Idle cycles hold the stopped motors
    let before = sim.true_pose();
    for _ in 0..10 {
        sim.step(0.05);
        assert_eq!(driver.cycle_from(&mut encoders), TickResult::NoOp);
    }
    assert_eq!(sim.true_pose(), before);
}

#[test]
fn test_cycle_archive() {
    let path = std::env::temp_dir().join("nav_scenarios_cycle.csv");

    let rec = SpeedRecorder::default();
    let mut driver = scenario_driver(true, &rec);
    driver.set_archiver(Archiver::from_file_path(&path).unwrap());

    for _ in 0..2 {
        driver.cycle(&WheelTicks { left: 2000, right: 2000 });
        driver.write().unwrap();
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("cycle,left_ticks,right_ticks,x_mm"));
    assert!(lines[1].starts_with("0,2000,2000,10.0,"));
    assert!(lines[2].contains("Correction"));

    assert_abs_diff_eq!(driver.estimator().pose().x_mm(), 20.0, epsilon = 1e-9);

    let _ = std::fs::remove_file(&path);
}
