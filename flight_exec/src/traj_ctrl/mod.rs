//! # Trajectory control module
//!
//! Trajectory control is responsible for flying the platform from its
//! current pose to a commanded end pose over a given duration. A background
//! scheduler runs one control step per tick (100 ms in the reference
//! parameters). Each step reads the elapsed time of the active trajectory,
//! advances the commanded target pose, turns the error between target and
//! actual pose into a velocity command, and hands the command to an
//! externally supplied sink for actuation.
//!
//! Most axes fly open loop: the platform is assumed to track the commanded
//! target perfectly, so `actual` is simply advanced to `target` each tick.
//! Axes with sensor coverage (heading always, altitude optionally) can be
//! corrected by feeding measurements in through [`TrajCtrl::set_actual_yaw`]
//! and [`TrajCtrl::set_actual_z`]; a proportional corrective term derived
//! from the measured error is then added to the command. A corrective gain
//! of zero is the explicit way to declare an axis open loop, it is not
//! special-cased away.
//!
//! How the target is advanced is a pluggable policy (see
//! [`params::ProfileType`]): either direct interpolation of position between
//! the trajectory's start and end poses, or a trapezoidal velocity ramp for
//! actuators that only accept accelerate/cruise/decelerate commands.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_interp;
mod calc_ramp;
mod ctrl;
mod handle;
mod params;
mod profile;
mod sink;
mod state;
mod trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use ctrl::TrajCtrl;
pub use handle::{PathHandle, PathOutcome};
pub use params::{Params, ProfileType};
pub use sink::{SinkError, VelocitySink};
pub use state::StatusReport;
pub use trajectory::Trajectory;

use util::params as util_params;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during TrajCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util_params::LoadError),

    /// The tick period must be a positive number of milliseconds, anything
    /// else would stall or spin the scheduler.
    #[error("Invalid tick period: {0} ms (must be positive and finite)")]
    InvalidTickPeriod(f64)
}
