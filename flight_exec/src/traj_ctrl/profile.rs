//! Velocity profile policy interface

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::calc_interp::InterpProfile;
use super::calc_ramp::RampProfile;
use super::params::{Params, ProfileType};
use super::trajectory::Trajectory;
use crate::pose::Pose;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A velocity profile policy.
///
/// The policy decides how the commanded `target` advances over the lifetime
/// of a trajectory and what raw (uncorrected) velocity command results. The
/// surrounding control step is shared between policies: it applies the
/// closed-loop corrective terms, advances the actual pose, and emits the
/// command.
pub(crate) trait VelProfile: Send {
    /// Reset the profile for a newly installed trajectory.
    fn restart(&mut self, traj: &Trajectory);

    /// Advance `target` for this tick and return the raw velocity command.
    ///
    /// `fraction` is the elapsed fraction of the active trajectory, or
    /// `None` once the trajectory is complete (or there is none), in which
    /// case the target must not be advanced further.
    fn raw_cmd(
        &mut self,
        fraction: Option<f64>,
        target: &mut Pose,
        actual: &Pose,
        params: &Params
    ) -> Pose;
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the profile selected by the parameters.
pub(crate) fn make_profile(params: &Params) -> Box<dyn VelProfile> {
    match params.profile {
        ProfileType::Interp => Box::new(InterpProfile::default()),
        ProfileType::Ramp => Box::new(RampProfile::default())
    }
}
