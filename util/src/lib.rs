//! Utility library for the navigation software
//!
//! Provides the ambient services shared by the executables in the
//! workspace: logging, parameter loading, sessions and archiving, the module
//! `State` trait and common maths.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod archive;
pub mod host;
pub mod logger;
pub mod maths;
pub mod module;
pub mod params;
pub mod session;
pub mod time;
