//! Position interpolation profile calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::params::Params;
use super::profile::VelProfile;
use super::trajectory::Trajectory;
use crate::pose::Pose;
use util::maths::{ang_diff_deg, lerp, wrap_deg};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Profile which tracks a target pose interpolated between the trajectory's
/// start and end.
///
/// Linear axes interpolate linearly. The heading interpolates circularly
/// along the arc of 180 degrees or less between the start and end headings,
/// so a trajectory crossing the +/-180 boundary turns the short way round.
/// The raw command is the error between target and actual scaled by the
/// proportional gains.
#[derive(Default)]
pub(crate) struct InterpProfile {
    start: Pose,
    end: Pose
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelProfile for InterpProfile {
    fn restart(&mut self, traj: &Trajectory) {
        self.start = *traj.start();
        self.end = *traj.end();
    }

    fn raw_cmd(
        &mut self,
        fraction: Option<f64>,
        target: &mut Pose,
        actual: &Pose,
        params: &Params
    ) -> Pose {
        // While the trajectory is running advance the target, once complete
        // the target holds at its last value.
        if let Some(f) = fraction {
            target.x = lerp(self.start.x, self.end.x, f);
            target.y = lerp(self.start.y, self.end.y, f);
            target.z = lerp(self.start.z, self.end.z, f);
            target.yaw_deg = wrap_deg(
                self.start.yaw_deg
                    + f * ang_diff_deg(self.end.yaw_deg, self.start.yaw_deg)
            );
        }

        Pose {
            x: (target.x - actual.x) * params.gain_linear,
            y: (target.y - actual.y) * params.gain_linear,
            z: (target.z - actual.z) * params.gain_linear,
            yaw_deg: ang_diff_deg(target.yaw_deg, actual.yaw_deg)
                * params.gain_yaw
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
