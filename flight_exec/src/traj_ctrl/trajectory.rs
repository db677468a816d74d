//! Trajectory data structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::time::Instant;

// Internal
use crate::pose::Pose;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A time-bounded path between a start and end pose.
///
/// The trajectory's clock starts counting at construction and is monotonic
/// for the trajectory's lifetime. Start, end and duration never change once
/// constructed, only the elapsed reading advances.
#[derive(Debug, Clone)]
pub struct Trajectory {
    start: Pose,
    end: Pose,
    duration_ms: f64,
    clock: Instant
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Create a new trajectory and start its clock.
    ///
    /// Headings are normalised on the way in. A zero duration is legal and
    /// means the trajectory is already complete; negative durations are
    /// treated as zero.
    pub fn new(start: Pose, end: Pose, duration_ms: f64) -> Self {
        Self {
            start: Pose::new(start.x, start.y, start.z, start.yaw_deg),
            end: Pose::new(end.x, end.y, end.z, end.yaw_deg),
            duration_ms: duration_ms.max(0f64),
            clock: Instant::now()
        }
    }

    /// The pose the trajectory departs from.
    pub fn start(&self) -> &Pose {
        &self.start
    }

    /// The pose the trajectory arrives at.
    pub fn end(&self) -> &Pose {
        &self.end
    }

    /// The total duration of the trajectory in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Milliseconds elapsed since construction.
    pub fn elapsed_ms(&self) -> f64 {
        self.clock.elapsed().as_secs_f64() * 1000f64
    }

    /// True once the elapsed time has reached the total duration.
    pub fn is_complete(&self) -> bool {
        self.elapsed_ms() >= self.duration_ms
    }

    /// The elapsed fraction of the trajectory, clamped into [0, 1].
    ///
    /// A zero-duration trajectory is complete from the first reading, so
    /// the fraction is 1 and no division is performed.
    pub fn fraction(&self) -> f64 {
        if self.duration_ms <= 0f64 {
            return 1f64
        }

        clamp(self.elapsed_ms() / self.duration_ms, 0f64, 1f64)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
