//! TrajCtrl implementation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// Internal
use super::handle::{completion_pair, PathHandle};
use super::params::Params;
use super::sink::{run_emitter, CmdSlot, VelocitySink};
use super::state::{CtrlState, StatusReport};
use super::trajectory::Trajectory;
use super::TrajCtrlError;
use crate::pose::Pose;
use util::params as util_params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory controller.
///
/// Owns a scheduler thread running one control step per tick and an emitter
/// thread delivering the resulting velocity commands to the sink supplied at
/// construction. All methods are callable from any thread. Dropping the
/// controller stops both threads, delivering any in-flight command first.
pub struct TrajCtrl {
    /// Parameters the controller was built with.
    params: Params,

    /// State cell shared with the scheduler thread.
    state: Arc<Mutex<CtrlState>>,

    /// Mailbox between the scheduler and the emitter.
    slot: Arc<CmdSlot>,

    /// Raised to request both threads to exit.
    stop_flag: Arc<AtomicBool>,

    sched_handle: Option<JoinHandle<()>>,
    emitter_handle: Option<JoinHandle<()>>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajCtrl {
    /// Create the controller and start its scheduler, loading parameters
    /// from the given file in the software root's `params` directory.
    pub fn from_file(
        params_path: &str,
        sink: Box<dyn VelocitySink>
    ) -> Result<Self, TrajCtrlError> {
        let params: Params = util_params::load(params_path)
            .map_err(TrajCtrlError::ParamLoadError)?;

        Self::new(params, sink)
    }

    /// Create the controller and start its scheduler.
    pub fn new(
        params: Params,
        sink: Box<dyn VelocitySink>
    ) -> Result<Self, TrajCtrlError> {
        if !params.tick_period_ms.is_finite() || params.tick_period_ms <= 0f64 {
            return Err(TrajCtrlError::InvalidTickPeriod(params.tick_period_ms))
        }

        let state = Arc::new(Mutex::new(CtrlState::new(&params)));
        let slot = Arc::new(CmdSlot::new());
        let stop_flag = Arc::new(AtomicBool::new(false));

        let emitter_slot = slot.clone();
        let emitter_handle = thread::spawn(move || {
            run_emitter(&emitter_slot, sink)
        });

        let sched_state = state.clone();
        let sched_slot = slot.clone();
        let sched_stop = stop_flag.clone();
        let sched_params = params.clone();
        let sched_handle = thread::spawn(move || {
            run_scheduler(&sched_state, &sched_slot, &sched_stop, &sched_params)
        });

        info!(
            "TrajCtrl initialised: {:?} profile, {} ms tick period",
            params.profile, params.tick_period_ms
        );

        Ok(Self {
            params,
            state,
            slot,
            stop_flag,
            sched_handle: Some(sched_handle),
            emitter_handle: Some(emitter_handle)
        })
    }

    /// Command a path from the current target pose to `end` over
    /// `duration_ms` milliseconds.
    ///
    /// Any active trajectory is superseded. The returned handle resolves
    /// when the new trajectory completes, is superseded or is stopped.
    pub fn start(&self, end: Pose, duration_ms: f64) -> PathHandle {
        let (signal, handle) = completion_pair();
        let mut state = lock_state(&self.state);

        let traj = Trajectory::new(state.next_start(), end, duration_ms);
        info!(
            "Path commanded: end {:?} over {} ms",
            traj.end(),
            traj.duration_ms()
        );

        state.install(traj, signal);

        handle
    }

    /// Abandon the active trajectory.
    ///
    /// The scheduler keeps ticking, holding the platform at the last
    /// commanded target.
    pub fn stop(&self) {
        info!("Path stop commanded");
        lock_state(&self.state).clear();
    }

    /// Supply a heading measurement.
    ///
    /// Consumed by the next control step only, then the controller falls
    /// back to the perfect tracking assumption until the next sample.
    pub fn set_actual_yaw(&self, yaw_deg: f64) {
        lock_state(&self.state).set_actual_yaw(yaw_deg);
    }

    /// Supply an altitude measurement.
    ///
    /// Ignored unless altitude feedback is enabled in the parameters.
    pub fn set_actual_z(&self, z: f64) {
        lock_state(&self.state).set_actual_z(z);
    }

    /// Snapshot the controller's state for monitoring.
    pub fn status_report(&self) -> StatusReport {
        lock_state(&self.state).report()
    }

    /// The parameters the controller was built with.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl Drop for TrajCtrl {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);

        // Scheduler first, so no further commands are posted, then close
        // the slot so the emitter delivers any in-flight command and exits.
        if let Some(handle) = self.sched_handle.take() {
            if handle.join().is_err() {
                warn!("TrajCtrl scheduler thread panicked");
            }
        }

        self.slot.close();

        if let Some(handle) = self.emitter_handle.take() {
            if handle.join().is_err() {
                warn!("TrajCtrl emitter thread panicked");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Scheduler thread body, one control step per tick until stopped.
fn run_scheduler(
    state: &Mutex<CtrlState>,
    slot: &CmdSlot,
    stop_flag: &AtomicBool,
    params: &Params
) {
    let period = Duration::from_secs_f64(params.tick_period_ms / 1000f64);

    while !stop_flag.load(Ordering::Relaxed) {
        let cycle_start = Instant::now();

        let cmd = lock_state(state).step(params);
        slot.post(cmd);

        match period.checked_sub(cycle_start.elapsed()) {
            Some(remaining) => thread::sleep(remaining),
            None => warn!(
                "TrajCtrl cycle overran its {} ms period",
                params.tick_period_ms
            )
        }
    }
}

/// Lock the state cell, recovering from poisoning.
///
/// A panic on another thread mid-step can leave the state stale but never
/// structurally invalid, every step rewrites the fields it touches.
fn lock_state(state: &Mutex<CtrlState>) -> MutexGuard<CtrlState> {
    match state.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj_ctrl::PathOutcome;

    /// Params with a fast tick so the tests run quickly.
    fn test_params() -> Params {
        let mut params = Params::default();
        params.tick_period_ms = 5.0;
        params
    }

    /// Sink recording every delivered command.
    fn recording_sink() -> (Box<dyn VelocitySink>, Arc<Mutex<Vec<Pose>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink_log = log.clone();

        let sink = Box::new(move |cmd: Pose| {
            sink_log.lock().unwrap().push(cmd);
        });

        (sink, log)
    }

    #[test]
    fn test_invalid_tick_period_rejected() {
        let (sink, _) = recording_sink();
        assert!(matches!(
            TrajCtrl::new(
                Params {
                    tick_period_ms: 0.0,
                    ..Params::default()
                },
                sink
            ),
            Err(TrajCtrlError::InvalidTickPeriod(_))
        ));
    }

    #[test]
    fn test_path_completes() {
        let (sink, log) = recording_sink();
        let ctrl = TrajCtrl::new(test_params(), sink).unwrap();

        let handle = ctrl.start(Pose::new(1.0, 0.0, 0.0, 0.0), 50.0);

        assert_eq!(
            handle.wait_timeout(Duration::from_secs(5)),
            Some(PathOutcome::Completed)
        );

        // The scheduler emitted commands and none of them were garbage
        let log = log.lock().unwrap();
        assert!(!log.is_empty());
        for cmd in log.iter() {
            assert!(!cmd.is_degenerate());
        }
    }

    #[test]
    fn test_stop_resolves_and_holds() {
        let (sink, _) = recording_sink();
        let ctrl = TrajCtrl::new(test_params(), sink).unwrap();

        let handle = ctrl.start(Pose::new(10.0, 0.0, 0.0, 0.0), 60_000.0);
        ctrl.stop();

        assert_eq!(handle.wait(), PathOutcome::Stopped);

        // The target holds once stopped
        thread::sleep(Duration::from_millis(20));
        let first = ctrl.status_report();
        thread::sleep(Duration::from_millis(20));
        let second = ctrl.status_report();

        assert_eq!(first.target, second.target);
        assert_eq!(second.fraction, None);
        assert!(second.tick_count > first.tick_count);
    }

    #[test]
    fn test_new_path_supersedes() {
        let (sink, _) = recording_sink();
        let ctrl = TrajCtrl::new(test_params(), sink).unwrap();

        let first = ctrl.start(Pose::new(1.0, 0.0, 0.0, 0.0), 60_000.0);
        let second = ctrl.start(Pose::new(2.0, 0.0, 0.0, 0.0), 50.0);

        assert_eq!(first.outcome(), Some(PathOutcome::Superseded));
        assert_eq!(
            second.wait_timeout(Duration::from_secs(5)),
            Some(PathOutcome::Completed)
        );
    }

    #[test]
    fn test_concurrent_feedback_stress() {
        let (sink, _) = recording_sink();
        let ctrl = Arc::new(TrajCtrl::new(test_params(), sink).unwrap());

        ctrl.start(Pose::new(5.0, 5.0, 0.0, 90.0), 200.0);

        // Hammer the feedback interface from several threads while the
        // scheduler ticks, sampling status reports throughout. Torn state
        // would show up as an out of range or non-finite heading.
        let writers: Vec<_> = (0..4)
            .map(|i| {
                let ctrl = ctrl.clone();
                thread::spawn(move || {
                    for j in 0..200 {
                        ctrl.set_actual_yaw((i * 40 + j % 40) as f64);
                        ctrl.set_actual_z(j as f64 / 10.0);
                    }

                    // Finish with a known sentinel, stepping under the
                    // state lock so the consuming tick's view is
                    // observable before the scheduler can advance past
                    // it. The consumed heading must be exactly the last
                    // written value, a torn write would surface here.
                    let sentinel = 100.0 + i as f64;
                    let mut state = lock_state(&ctrl.state);
                    state.set_actual_yaw(sentinel);
                    state.step(ctrl.params());
                    assert_eq!(state.report().actual.yaw_deg, sentinel);
                })
            })
            .collect();

        for _ in 0..20 {
            let report = ctrl.status_report();
            assert!(!report.actual.is_degenerate());
            assert!(!report.target.is_degenerate());
            assert!(
                report.actual.yaw_deg > -180.0 && report.actual.yaw_deg <= 180.0
            );
            thread::sleep(Duration::from_millis(2));
        }

        for writer in writers {
            writer.join().unwrap();
        }
    }

    #[test]
    fn test_drop_shuts_down_cleanly() {
        let (sink, log) = recording_sink();

        {
            let ctrl = TrajCtrl::new(test_params(), sink).unwrap();
            ctrl.start(Pose::new(1.0, 0.0, 0.0, 0.0), 60_000.0);
            thread::sleep(Duration::from_millis(30));
        }

        // Both threads have joined, no further commands can arrive
        let count = log.lock().unwrap().len();
        assert!(count > 0);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(log.lock().unwrap().len(), count);
    }
}
