//! # Navigation library.
//!
//! This library allows other crates in the workspace (and the integration
//! tests and benches) to access items defined inside the navigation crate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Periodic driver - runs odometry then waypoint control once per cycle
pub mod driver;

/// Localisation module - estimates the vehicle pose from wheel odometry
pub mod loc;

/// Motor module - adapters from drive commands to motor hardware
pub mod motor;

/// Executable parameters
pub mod params;

/// Simulation client - a simulated differential-drive vehicle
pub mod sim_client;

/// Waypoint control module - steers the vehicle through a route of waypoints
pub mod wp_ctrl;
