use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nav_lib::{
    driver::{NavDriver, CYCLE_PERIOD_S},
    loc::{integrate_arc, CalibrationParams, HeadingFrame, Pose, PoseEstimator},
    motor::MotorKind,
    sim_client::{SimClient, SimParams},
    wp_ctrl::{Params, WaypointCtrl}
};
use util::module::State;

fn bench_integrate_arc(c: &mut Criterion) {
    let pose = Pose::new(100.0, -50.0, 0.3);

    c.bench_function("integrate_arc", |b| b.iter(|| {
        integrate_arc(black_box(&pose), black_box(90.0), black_box(110.0), 170.0)
    }));
}

fn bench_nav_cycle(c: &mut Criterion) {
    let sim = SimClient::new(SimParams::default());
    let mut encoders = sim.encoders();

    let estimator = PoseEstimator::new(CalibrationParams::default()).unwrap();

    let mut ctrl = WaypointCtrl::new();
    ctrl.init(Params::default()).unwrap();
    ctrl.set_boxed_pose_source(HeadingFrame::Clockwise.wrap(estimator.pose_handle()));
    ctrl.set_boxed_motor_sink(MotorKind::Differential.sink(sim.motors()));

    for (x, y) in [(1000.0, 0.0), (1000.0, 1000.0), (0.0, 1000.0), (0.0, 0.0)].iter() {
        ctrl.add_waypoint(*x, *y);
    }
    ctrl.start().unwrap();

    let mut driver = NavDriver::new(estimator, ctrl);

    c.bench_function("nav_cycle", |b| b.iter(|| {
        sim.step(CYCLE_PERIOD_S);
        black_box(driver.cycle_from(&mut encoders))
    }));
}

criterion_group!(benches, bench_integrate_arc, bench_nav_cycle);
criterion_main!(benches);
