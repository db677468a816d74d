//! Path completion handles

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How a commanded path ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOutcome {
    /// A control step observed the trajectory's elapsed time reach its
    /// duration.
    Completed,

    /// A newer `start` call replaced the trajectory before it completed.
    Superseded,

    /// `stop` cleared the trajectory before it completed.
    Stopped
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Caller-side handle to a path commanded with `start`.
///
/// Resolves exactly once, at the tick which observes the trajectory
/// complete, or immediately when the trajectory is superseded or stopped.
pub struct PathHandle {
    cell: Arc<SignalCell>
}

/// Controller-side half of the handle, used to resolve it.
pub(crate) struct CompletionSignal {
    cell: Arc<SignalCell>
}

struct SignalCell {
    outcome: Mutex<Option<PathOutcome>>,
    cond: Condvar
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

/// Create a linked signal/handle pair for a newly commanded path.
pub(crate) fn completion_pair() -> (CompletionSignal, PathHandle) {
    let cell = Arc::new(SignalCell {
        outcome: Mutex::new(None),
        cond: Condvar::new()
    });

    (
        CompletionSignal { cell: cell.clone() },
        PathHandle { cell }
    )
}

impl CompletionSignal {
    /// Resolve the linked handle, waking any waiters.
    pub(crate) fn resolve(self, outcome: PathOutcome) {
        *self.cell.lock_outcome() = Some(outcome);
        self.cell.cond.notify_all();
    }
}

impl PathHandle {
    /// The outcome of the path, or `None` while it is still flying.
    pub fn outcome(&self) -> Option<PathOutcome> {
        *self.cell.lock_outcome()
    }

    /// Block until the path resolves.
    pub fn wait(&self) -> PathOutcome {
        let mut guard = self.cell.lock_outcome();

        loop {
            if let Some(outcome) = *guard {
                return outcome
            }

            guard = match self.cell.cond.wait(guard) {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner()
            };
        }
    }

    /// Block until the path resolves or the timeout expires.
    ///
    /// The timeout is a deadline, spurious wakeups re-wait only on the
    /// remainder.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<PathOutcome> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.cell.lock_outcome();

        loop {
            if let Some(outcome) = *guard {
                return Some(outcome)
            }

            let remaining = match deadline.checked_duration_since(Instant::now()) {
                Some(d) if d > Duration::from_secs(0) => d,
                _ => return *guard
            };

            guard = match self.cell.cond.wait_timeout(guard, remaining) {
                Ok((g, _)) => g,
                Err(poisoned) => poisoned.into_inner().0
            };
        }
    }
}

impl SignalCell {
    /// Lock the outcome, recovering from poisoning.
    ///
    /// The outcome is a plain copy type so a panic elsewhere cannot leave
    /// it in a half-written state.
    fn lock_outcome(&self) -> MutexGuard<Option<PathOutcome>> {
        match self.outcome.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner()
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
