//! Utility library for the Icarus quadrotor flight software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod host;
pub mod logger;
pub mod maths;
pub mod params;
pub mod session;
