//! # Flight library.
//!
//! This library allows other crates in the workspace to access items defined
//! inside the flight crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Pose - the 4 degree of freedom position and heading of the platform
pub mod pose;

/// Trajectory control module - flies the platform from its current pose to a commanded pose
pub mod traj_ctrl;
