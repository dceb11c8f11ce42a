//! Main navigation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Simulated vehicle step
//!         - Odometry processing
//!         - Waypoint control processing
//!         - Archiving
//!     - Save the route summary
//!
//! # Modules
//!
//! All modules (e.g. `wp_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::WrapErr};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use nav_lib::{
    driver::NavDriver,
    loc::{Pose, PoseEstimator, PoseSource},
    params::{NavExecParams, RouteFile},
    sim_client::SimClient,
    wp_ctrl::{NavMode, TickResult, Waypoint, WaypointCtrl}
};
use util::{
    archive::{Archived, Archiver},
    logger::{logger_init, LevelFilter},
    session::{self, Session}
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options
#[derive(Debug, StructOpt)]
#[structopt(name = "nav_exec", about = "Waypoint navigation of a simulated vehicle")]
struct Opt {
    /// Maximum number of cycles to run, overrides the parameter file
    #[structopt(long)]
    max_cycles: Option<u64>,

    /// Sleep to the cycle period rather than running as fast as possible
    #[structopt(long)]
    realtime: bool,

    /// A TOML route file to use instead of the route in nav_exec.toml
    #[structopt(long, parse(from_os_str))]
    route: Option<PathBuf>
}

/// Summary of the execution, saved at the end of the session
#[derive(Debug, Serialize)]
struct RouteSummary {
    num_cycles: u64,
    elapsed_s: f64,
    route: Vec<Waypoint>,
    waypoints_reached: Vec<usize>,
    route_completed: bool,
    final_mode: NavMode,
    estimated_pose: Pose,
    true_pose: Pose,
    estimate_error_mm: f64
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "nav_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Navigation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let exec_params: NavExecParams = util::params::load("nav_exec.toml")
        .wrap_err("Could not load exec params")?;

    let route = match opt.route {
        Some(ref path) => {
            info!("Loading route from {:?}", path);
            let r: RouteFile = util::params::load_from_path(path)
                .wrap_err("Could not load the route file")?;
            r.waypoints
        },
        None => exec_params.route.clone()
    };

    let max_cycles = opt.max_cycles.unwrap_or(exec_params.max_cycles);

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let estimator = PoseEstimator::from_params("odometry.toml")
        .wrap_err("Failed to initialise the PoseEstimator")?;
    info!("PoseEstimator init complete");

    let mut ctrl = WaypointCtrl::from_params("wp_ctrl.toml")
        .wrap_err("Failed to initialise WpCtrl")?;
    info!("WpCtrl init complete");

    let sim = SimClient::new(exec_params.sim);
    let mut encoders = sim.encoders();
    info!("SimClient initialised");

    ctrl.set_boxed_pose_source(
        exec_params.heading_frame.wrap(estimator.pose_handle())
    );
    ctrl.set_boxed_motor_sink(exec_params.motor_kind.sink(sim.motors()));
    info!(
        "Using {:?} motors in the {:?} heading frame",
        exec_params.motor_kind,
        exec_params.heading_frame
    );

    for wp in route.iter() {
        ctrl.add_waypoint(wp.x_mm, wp.y_mm);
    }

    ctrl.start().wrap_err("Failed to start navigation")?;

    let mut driver = NavDriver::new(estimator, ctrl);
    driver.set_archiver(
        Archiver::from_path(&session, "nav/cycle.csv")
            .wrap_err("Failed to create the cycle archive")?
    );

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let mut waypoints_reached = Vec::new();
    let mut route_completed = false;

    info!("Begining main loop\n");

    while driver.num_cycles() < max_cycles {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- SIMULATION ----
        sim.step(exec_params.cycle_period_s);

        // ---- NAVIGATION ----
        match driver.cycle_from(&mut encoders) {
            TickResult::WaypointReached(i) => waypoints_reached.push(i),
            TickResult::RouteCompleted => {
                waypoints_reached.push(route.len() - 1);
                route_completed = true;
            },
            _ => ()
        }

        // ---- WRITE ARCHIVES ----
        if let Err(e) = driver.write() {
            warn!("Could not write the cycle archive: {}", e);
        }

        if route_completed {
            info!("Route completed in {} cycles", driver.num_cycles());
            break
        }

        // ---- CYCLE MANAGEMENT ----
        if opt.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            // Get sleep duration
            match cycle_period.checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                )
            }
        }
    }

    // ---- SHUTDOWN ----

    driver.ctrl_mut().stop();

    let estimated_pose = driver.estimator().pose();
    let true_pose = sim.true_pose();

    let summary = RouteSummary {
        num_cycles: driver.num_cycles(),
        elapsed_s: session::get_elapsed_seconds(),
        route,
        waypoints_reached,
        route_completed,
        final_mode: driver.ctrl().mode(),
        estimated_pose,
        true_pose,
        estimate_error_mm: estimated_pose.distance_to(&true_pose.position_mm)
    };

    info!(
        "Estimated pose ({:.1}, {:.1}, {:.1} deg), true pose ({:.1}, {:.1}, {:.1} deg)",
        estimated_pose.x_mm(), estimated_pose.y_mm(), estimated_pose.heading_deg(),
        true_pose.x_mm(), true_pose.y_mm(), true_pose.heading_deg()
    );

    session.save("nav/summary.json", &summary)
        .wrap_err("Failed to save the route summary")?;

    info!("End of execution");

    Ok(())
}
