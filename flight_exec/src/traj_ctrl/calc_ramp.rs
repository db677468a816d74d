//! Trapezoidal velocity ramp profile calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::params::Params;
use super::profile::VelProfile;
use super::trajectory::Trajectory;
use crate::pose::Pose;
use util::maths::{ang_diff_deg, norm};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Elapsed fraction at which the ramp stops accelerating.
const ACCEL_END_FRACTION: f64 = 1.0 / 3.0;

/// Elapsed fraction at which the ramp starts decelerating.
const DECEL_START_FRACTION: f64 = 2.0 / 3.0;

/// Direction magnitudes below this are treated as no motion.
const MIN_DIRECTION_MAG: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Profile which ramps a velocity accumulator up, holds it, and ramps it
/// back down over three equal-duration phases of the trajectory.
///
/// Under this profile `target` is the velocity accumulator itself rather
/// than an interpolated position, and the raw command is a copy of it. This
/// suits actuators that only accept a rate demand shaped as a trapezoid.
#[derive(Default)]
pub(crate) struct RampProfile {
    /// Unit direction of the trajectory in the linear axes, with the signed
    /// heading change carried in the fourth element. All zero when the
    /// trajectory has no linear extent, commanding no motion.
    direction: [f64; 4],

    /// Current accumulated velocity magnitude.
    vel_mag: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelProfile for RampProfile {
    fn restart(&mut self, traj: &Trajectory) {
        let delta = [
            traj.end().x - traj.start().x,
            traj.end().y - traj.start().y,
            traj.end().z - traj.start().z
        ];

        let mag = norm(&delta);

        // A degenerate direction must not be divided through, that would
        // poison the accumulator with NaNs. No direction means no motion.
        if mag < MIN_DIRECTION_MAG {
            self.direction = [0f64; 4];
        }
        else {
            self.direction = [
                delta[0] / mag,
                delta[1] / mag,
                delta[2] / mag,
                ang_diff_deg(traj.end().yaw_deg, traj.start().yaw_deg)
            ];
        }

        self.vel_mag = 0f64;
    }

    fn raw_cmd(
        &mut self,
        fraction: Option<f64>,
        target: &mut Pose,
        _actual: &Pose,
        params: &Params
    ) -> Pose {
        match fraction {
            // Acceleration phase, step the accumulator up to the limit.
            // The final step is clamped so the configured maximum is
            // reached exactly even when it is not a multiple of the step.
            Some(f) if f < ACCEL_END_FRACTION => {
                if self.vel_mag < params.ramp_vel_max {
                    let step = (params.ramp_vel_max - self.vel_mag)
                        .min(params.ramp_accel_step);
                    self.vel_mag += step;
                    self.apply_step(target, step);
                }
            }

            // Constant velocity phase, nothing to update
            Some(f) if f < DECEL_START_FRACTION => (),

            // Deceleration phase, also entered once the trajectory is
            // complete so a never-stopped trajectory winds down to rest
            // rather than holding a stale rate.
            _ => {
                if self.vel_mag > params.ramp_accel_step {
                    self.vel_mag -= params.ramp_accel_step;
                    self.apply_step(target, -params.ramp_accel_step);
                }
                else if self.vel_mag > 0f64 {
                    self.vel_mag = 0f64;
                    *target = Pose::default();
                }
            }
        }

        *target
    }
}

impl RampProfile {
    /// Add `step * direction` to the velocity accumulator.
    fn apply_step(&self, target: &mut Pose, step: f64) {
        target.x += step * self.direction[0];
        target.y += step * self.direction[1];
        target.z += step * self.direction[2];
        target.yaw_deg += step * self.direction[3];
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
