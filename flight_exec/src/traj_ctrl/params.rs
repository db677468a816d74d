//! Parameters structure for TrajCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Trajectory control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- SCHEDULING ----

    /// Period of one control cycle.
    ///
    /// Units: milliseconds
    pub tick_period_ms: f64,

    // ---- GAINS ----

    /// Proportional gain turning linear position error into a rate demand
    /// on the x, y and z axes.
    ///
    /// Units: 1/second
    pub gain_linear: f64,

    /// Proportional gain turning heading error into a turn rate demand.
    ///
    /// Units: 1/second
    pub gain_yaw: f64,

    /// Corrective gain applied to the measured heading error when sensor
    /// feedback is available. Zero declares the heading loop open.
    ///
    /// Units: 1/second
    pub yaw_corr_gain: f64,

    /// If true the altitude (z) axis is flown closed loop using samples
    /// supplied through `set_actual_z`.
    pub z_feedback_enabled: bool,

    /// Corrective gain applied to the measured altitude error. Zero
    /// declares the altitude loop open.
    ///
    /// Units: 1/second
    pub z_corr_gain: f64,

    // ---- VELOCITY PROFILE ----

    /// Which velocity profile policy drives the commanded target.
    pub profile: ProfileType,

    /// Velocity magnitude added (removed) per tick while the ramp profile
    /// is accelerating (decelerating).
    ///
    /// Units: linear unit/second
    pub ramp_accel_step: f64,

    /// Maximum velocity magnitude the ramp profile will accumulate.
    ///
    /// Units: linear unit/second
    pub ramp_vel_max: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The velocity profile policies available to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ProfileType {
    /// Interpolate the target pose between the trajectory's start and end,
    /// commanding a rate proportional to the remaining error.
    Interp,

    /// Accumulate velocity along the trajectory direction in a trapezoidal
    /// accelerate/cruise/decelerate ramp.
    Ramp
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    /// Reference gains for the simulation platform, matching
    /// `params/traj_ctrl.toml`.
    fn default() -> Self {
        Self {
            tick_period_ms: 100.0,
            gain_linear: 8.0,
            gain_yaw: 0.01,
            yaw_corr_gain: 0.01,
            z_feedback_enabled: true,
            z_corr_gain: 0.0,
            profile: ProfileType::Interp,
            ramp_accel_step: 0.05,
            ramp_vel_max: 0.5
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
