//! Controller state cell and the shared control step

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::handle::{CompletionSignal, PathOutcome};
use super::params::Params;
use super::profile::{make_profile, VelProfile};
use super::trajectory::Trajectory;
use crate::pose::Pose;
use util::maths::{ang_diff_deg, wrap_deg};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The mutable state of the controller.
///
/// One instance lives behind the controller's mutex and is touched by the
/// scheduler thread (one `step` per tick) and by feedback and command calls
/// from arbitrary caller threads. All fields travel together so a feedback
/// write can never interleave with half a control step.
pub(crate) struct CtrlState {
    /// The trajectory currently being flown, if any.
    traj: Option<Trajectory>,

    /// Completion signal for the active trajectory's handle.
    signal: Option<CompletionSignal>,

    /// The commanded target pose. Carried across trajectories, a new
    /// trajectory departs from wherever the previous one left the target.
    target: Pose,

    /// Best estimate of the platform's pose.
    ///
    /// Advanced to `target` at the end of every step (the perfect tracking
    /// assumption), then overwritten on axes for which a fresh sensor
    /// sample is pending. There is therefore no "missing" actual, stale
    /// axes simply read as the target.
    actual: Pose,

    /// Heading sample waiting to be consumed by the next step. `Some` is
    /// the fresh flag, `take` is the single consumption.
    pending_yaw_deg: Option<f64>,

    /// Altitude sample waiting to be consumed by the next step.
    pending_z: Option<f64>,

    /// The velocity profile policy driving the target.
    profile: Box<dyn VelProfile>,

    /// The command produced by the most recent step.
    last_cmd: Pose,

    /// Number of steps executed since construction.
    tick_count: u64
}

/// Snapshot of the controller's state for monitoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    /// The commanded target pose.
    pub target: Pose,

    /// The estimated actual pose.
    pub actual: Pose,

    /// Elapsed fraction of the active trajectory, `None` when no
    /// trajectory is being flown.
    pub fraction: Option<f64>,

    /// The velocity command produced by the most recent control step.
    pub last_cmd: Pose,

    /// Number of control steps executed since construction.
    pub tick_count: u64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CtrlState {
    /// Create a fresh state cell with the profile selected by `params`.
    pub(crate) fn new(params: &Params) -> Self {
        Self {
            traj: None,
            signal: None,
            target: Pose::default(),
            actual: Pose::default(),
            pending_yaw_deg: None,
            pending_z: None,
            profile: make_profile(params),
            last_cmd: Pose::default(),
            tick_count: 0
        }
    }

    /// The pose a newly commanded trajectory must depart from.
    pub(crate) fn next_start(&self) -> Pose {
        self.target
    }

    /// Install a new trajectory, superseding any active one.
    pub(crate) fn install(&mut self, traj: Trajectory, signal: CompletionSignal) {
        if let Some(old) = self.signal.take() {
            old.resolve(PathOutcome::Superseded);
        }

        self.profile.restart(&traj);
        self.traj = Some(traj);
        self.signal = Some(signal);
    }

    /// Clear the active trajectory, if any.
    ///
    /// The target holds at its last value, so subsequent steps command the
    /// platform to hold position.
    pub(crate) fn clear(&mut self) {
        if let Some(old) = self.signal.take() {
            old.resolve(PathOutcome::Stopped);
        }

        self.traj = None;
    }

    /// Record a heading measurement for the next step to consume.
    pub(crate) fn set_actual_yaw(&mut self, yaw_deg: f64) {
        self.pending_yaw_deg = Some(wrap_deg(yaw_deg));
    }

    /// Record an altitude measurement for the next step to consume.
    pub(crate) fn set_actual_z(&mut self, z: f64) {
        self.pending_z = Some(z);
    }

    /// Snapshot the state for monitoring.
    pub(crate) fn report(&self) -> StatusReport {
        StatusReport {
            target: self.target,
            actual: self.actual,
            fraction: self.traj.as_ref().map(|t| t.fraction()),
            last_cmd: self.last_cmd,
            tick_count: self.tick_count
        }
    }

    /// Execute one control step and return the velocity command to emit.
    pub(crate) fn step(&mut self, params: &Params) -> Pose {
        // Read the trajectory clock once per step. A completed trajectory
        // is retired here, at the tick which observes it, and its handle
        // resolved before the command is computed.
        let fraction = match self.traj.as_ref() {
            Some(traj) if traj.is_complete() => {
                if let Some(signal) = self.signal.take() {
                    signal.resolve(PathOutcome::Completed);
                }
                self.traj = None;

                None
            }
            Some(traj) => Some(traj.fraction()),
            None => None
        };

        // Split borrows so the profile can advance the target while reading
        // the actual pose
        let Self {
            profile,
            target,
            actual,
            ..
        } = self;

        let mut cmd = profile.raw_cmd(fraction, target, actual, params);

        // Closed-loop corrective terms, pulling towards the target the
        // same way the raw proportional term does. Heading is always
        // corrected, altitude only when configured. A zero gain leaves the
        // term in place, it is the configured way to declare an axis open
        // loop.
        cmd.yaw_deg += params.yaw_corr_gain
            * ang_diff_deg(self.target.yaw_deg, self.actual.yaw_deg);

        if params.z_feedback_enabled {
            cmd.z += params.z_corr_gain * (self.target.z - self.actual.z);
        }

        // Advance the actual pose under the perfect tracking assumption,
        // then overwrite axes which have a fresh sample. Each sample is
        // consumed exactly once, a sample arriving faster than the tick
        // rate replaces the previous one unread.
        self.actual = self.target;

        if let Some(yaw_deg) = self.pending_yaw_deg.take() {
            self.actual.yaw_deg = yaw_deg;
        }

        if let Some(z) = self.pending_z.take() {
            if params.z_feedback_enabled {
                self.actual.z = z;
            }
        }

        self.last_cmd = cmd;
        self.tick_count += 1;

        trace!(
            "TrajCtrl step {}: fraction {:?}, cmd {:?}",
            self.tick_count,
            fraction,
            cmd
        );

        cmd
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use super::super::handle::completion_pair;

    fn install_traj(
        state: &mut CtrlState,
        end: Pose,
        duration_ms: f64
    ) -> crate::traj_ctrl::PathHandle {
        let (signal, handle) = completion_pair();
        let traj = Trajectory::new(state.next_start(), end, duration_ms);
        state.install(traj, signal);
        handle
    }

    #[test]
    fn test_completion_resolved_by_step() {
        let params = Params::default();
        let mut state = CtrlState::new(&params);

        let handle = install_traj(&mut state, Pose::default(), 0.0);
        assert_eq!(handle.outcome(), None);

        state.step(&params);
        assert_eq!(handle.outcome(), Some(PathOutcome::Completed));

        // Resolution happens exactly once
        state.step(&params);
        assert_eq!(handle.outcome(), Some(PathOutcome::Completed));
    }

    #[test]
    fn test_supersede_resolves_old_handle() {
        let params = Params::default();
        let mut state = CtrlState::new(&params);

        let first = install_traj(
            &mut state,
            Pose::new(1.0, 0.0, 0.0, 0.0),
            60_000.0
        );
        let second = install_traj(
            &mut state,
            Pose::new(2.0, 0.0, 0.0, 0.0),
            60_000.0
        );

        assert_eq!(first.outcome(), Some(PathOutcome::Superseded));
        assert_eq!(second.outcome(), None);
    }

    #[test]
    fn test_stop_then_hold() {
        let params = Params::default();
        let mut state = CtrlState::new(&params);

        // Zero duration is the degenerate worst case for a stop
        let handle = install_traj(
            &mut state,
            Pose::new(1.0, 2.0, 3.0, 40.0),
            0.0
        );
        state.clear();
        assert_eq!(handle.outcome(), Some(PathOutcome::Stopped));

        // With no trajectory the target holds, actual converges to it and
        // every command stays finite
        let held = state.report().target;
        for _ in 0..5 {
            let cmd = state.step(&params);
            assert!(!cmd.is_degenerate());
        }

        let report = state.report();
        assert_eq!(report.target, held);
        assert_eq!(report.actual, held);
        assert_eq!(report.fraction, None);
    }

    #[test]
    fn test_corr_gain_zero_is_exact() {
        let mut params = Params::default();
        params.yaw_corr_gain = 0.0;
        params.z_feedback_enabled = false;

        let mut state = CtrlState::new(&params);
        install_traj(&mut state, Pose::new(0.0, 0.0, 0.0, 90.0), 60_000.0);

        state.set_actual_yaw(10.0);
        let cmd = state.step(&params);

        // The corrective term is applied with gain zero, never skipped, so
        // the command must equal the raw proportional command exactly
        let report = state.report();
        let raw_yaw = ang_diff_deg(report.target.yaw_deg, 0.0) * params.gain_yaw;
        assert_eq!(cmd.yaw_deg, raw_yaw);
    }

    #[test]
    fn test_fresh_yaw_sample_strengthens_command() {
        let params = Params::default();
        let mut state = CtrlState::new(&params);
        install_traj(&mut state, Pose::new(0.0, 0.0, 0.0, 90.0), 60_000.0);

        // The sample lands in the actual pose on the first step, the
        // second step computes its command from it
        state.set_actual_yaw(-30.0);
        state.step(&params);
        let cmd = state.step(&params);

        // Raw and corrective terms pull the same way, so the measured
        // error is scaled by the sum of the gains, it must not cancel to
        // a zero net command
        let report = state.report();
        let err = ang_diff_deg(report.target.yaw_deg, -30.0);
        let expected = err * (params.gain_yaw + params.yaw_corr_gain);

        assert!((cmd.yaw_deg - expected).abs() < 1e-9);
        assert!(cmd.yaw_deg > 0.1);
    }

    #[test]
    fn test_fresh_z_sample_corrects_towards_target() {
        let mut params = Params::default();
        params.z_corr_gain = 0.5;

        let mut state = CtrlState::new(&params);
        install_traj(&mut state, Pose::new(0.0, 0.0, 10.0, 0.0), 60_000.0);

        state.set_actual_z(-1.0);
        state.step(&params);
        let cmd = state.step(&params);

        let report = state.report();
        let err = report.target.z - (-1.0);
        let expected = err * (params.gain_linear + params.z_corr_gain);

        assert!((cmd.z - expected).abs() < 1e-9);
        assert!(cmd.z > 0.0);
    }

    #[test]
    fn test_feedback_consumed_once() {
        let params = Params::default();
        let mut state = CtrlState::new(&params);
        install_traj(&mut state, Pose::new(10.0, 0.0, 0.0, 0.0), 60_000.0);

        state.set_actual_yaw(30.0);
        state.step(&params);

        // The sample landed in the actual pose for exactly one tick
        assert_eq!(state.report().actual.yaw_deg, 30.0);

        // The next step falls back to perfect tracking
        state.step(&params);
        let report = state.report();
        assert_eq!(report.actual.yaw_deg, report.target.yaw_deg);
    }

    #[test]
    fn test_latest_sample_wins() {
        let params = Params::default();
        let mut state = CtrlState::new(&params);

        state.set_actual_yaw(10.0);
        state.set_actual_yaw(20.0);
        state.step(&params);

        assert_eq!(state.report().actual.yaw_deg, 20.0);
    }

    #[test]
    fn test_z_feedback_disabled_ignores_samples() {
        let mut params = Params::default();
        params.z_feedback_enabled = false;

        let mut state = CtrlState::new(&params);
        state.set_actual_z(5.0);
        state.step(&params);

        assert_eq!(state.report().actual.z, state.report().target.z);
    }

    #[test]
    fn test_target_carried_across_trajectories() {
        let params = Params::default();
        let mut state = CtrlState::new(&params);

        // A zero duration trajectory completes on its first tick without
        // the target ever advancing towards its end pose
        let handle = install_traj(&mut state, Pose::new(4.0, 0.0, 0.0, 0.0), 0.0);
        state.step(&params);
        assert_eq!(handle.outcome(), Some(PathOutcome::Completed));
        assert_eq!(state.report().target.x, 0.0);

        // The next trajectory departs from the carried target, not from
        // the previous trajectory's commanded end
        let handle = install_traj(
            &mut state,
            Pose::new(8.0, 0.0, 0.0, 0.0),
            60_000.0
        );
        assert_eq!(state.next_start().x, 0.0);

        state.step(&params);
        assert_eq!(handle.outcome(), None);
        assert!(state.report().target.x >= 0.0);
        assert!(state.report().target.x < 8.0);
    }
}
