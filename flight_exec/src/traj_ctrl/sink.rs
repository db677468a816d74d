//! Velocity command sink and the emitter mailbox

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use std::sync::{Condvar, Mutex, MutexGuard};

// Internal
use crate::pose::Pose;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Error type returned by sink implementations.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Consumer of the velocity commands produced by the control loop.
///
/// Implementations typically forward the command to a flight interface or a
/// simulator. `send` is called from the controller's emitter thread, never
/// from the scheduler itself, so a slow sink delays command delivery but
/// cannot stall the control loop. A sink error is logged and the command
/// dropped, subsequent commands are still delivered.
pub trait VelocitySink: Send {
    /// Deliver one velocity command.
    fn send(&mut self, cmd: Pose) -> Result<(), SinkError>;
}

/// Infallible closures are accepted directly as sinks.
impl<F> VelocitySink for F
where
    F: FnMut(Pose) + Send
{
    fn send(&mut self, cmd: Pose) -> Result<(), SinkError> {
        self(cmd);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Depth-one mailbox between the scheduler and the emitter thread.
///
/// Holds at most the latest command. If the sink cannot keep up with the
/// tick rate, stale commands are replaced rather than queued, the platform
/// must never act on an out of date rate demand.
pub(crate) struct CmdSlot {
    inner: Mutex<SlotInner>,
    cond: Condvar
}

struct SlotInner {
    cmd: Option<Pose>,
    closed: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdSlot {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(SlotInner {
                cmd: None,
                closed: false
            }),
            cond: Condvar::new()
        }
    }

    /// Post a command, replacing any undelivered one.
    pub(crate) fn post(&self, cmd: Pose) {
        let mut inner = self.lock_inner();

        if inner.cmd.replace(cmd).is_some() {
            trace!("Velocity command overwritten before delivery");
        }

        self.cond.notify_one();
    }

    /// Close the slot, releasing the emitter once the last posted command
    /// has been delivered.
    pub(crate) fn close(&self) {
        self.lock_inner().closed = true;
        self.cond.notify_one();
    }

    /// Block until a command is available, `None` once the slot is closed
    /// and drained.
    pub(crate) fn take_blocking(&self) -> Option<Pose> {
        let mut inner = self.lock_inner();

        loop {
            if let Some(cmd) = inner.cmd.take() {
                return Some(cmd)
            }

            if inner.closed {
                return None
            }

            inner = match self.cond.wait(inner) {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner()
            };
        }
    }

    fn lock_inner(&self) -> MutexGuard<SlotInner> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner()
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Emitter thread body, delivers commands to the sink until the slot
/// closes.
pub(crate) fn run_emitter(slot: &CmdSlot, mut sink: Box<dyn VelocitySink>) {
    while let Some(cmd) = slot.take_blocking() {
        if let Err(e) = sink.send(cmd) {
            warn!("Velocity sink error, command dropped: {}", e);
        }
    }

    trace!("Velocity command emitter shut down");
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_latest_command_wins() {
        let slot = CmdSlot::new();

        slot.post(Pose::new(1.0, 0.0, 0.0, 0.0));
        slot.post(Pose::new(2.0, 0.0, 0.0, 0.0));

        assert_eq!(slot.take_blocking().unwrap().x, 2.0);
    }

    #[test]
    fn test_close_drains_pending() {
        let slot = CmdSlot::new();

        slot.post(Pose::new(3.0, 0.0, 0.0, 0.0));
        slot.close();

        // The posted command is still delivered, only then does the
        // emitter see the close
        assert_eq!(slot.take_blocking().unwrap().x, 3.0);
        assert_eq!(slot.take_blocking(), None);
    }

    #[test]
    fn test_sink_error_does_not_stop_emitter() {
        struct FlakySink {
            delivered: Arc<Mutex<Vec<f64>>>
        }

        impl VelocitySink for FlakySink {
            fn send(&mut self, cmd: Pose) -> Result<(), SinkError> {
                if cmd.x < 0.0 {
                    return Err("link down".into())
                }

                self.delivered.lock().unwrap().push(cmd.x);
                Ok(())
            }
        }

        let slot = Arc::new(CmdSlot::new());
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let sink = Box::new(FlakySink {
            delivered: delivered.clone()
        });

        let emitter_slot = slot.clone();
        let emitter = thread::spawn(move || run_emitter(&emitter_slot, sink));

        slot.post(Pose::new(-1.0, 0.0, 0.0, 0.0));
        thread::sleep(std::time::Duration::from_millis(10));
        slot.post(Pose::new(1.0, 0.0, 0.0, 0.0));
        thread::sleep(std::time::Duration::from_millis(10));
        slot.close();
        emitter.join().unwrap();

        // The failed command was dropped, the later one still arrived
        assert_eq!(*delivered.lock().unwrap(), vec![1.0]);
    }

    #[test]
    fn test_emitter_delivers_in_order() {
        let slot = Arc::new(CmdSlot::new());
        let delivered = Arc::new(Mutex::new(Vec::new()));

        let sink_log = delivered.clone();
        let sink = Box::new(move |cmd: Pose| {
            sink_log.lock().unwrap().push(cmd.x);
        });

        let emitter_slot = slot.clone();
        let emitter = thread::spawn(move || run_emitter(&emitter_slot, sink));

        for i in 0..5 {
            slot.post(Pose::new(i as f64, 0.0, 0.0, 0.0));
            // Give the emitter a chance to drain between posts
            thread::sleep(std::time::Duration::from_millis(5));
        }
        slot.close();
        emitter.join().unwrap();

        let delivered = delivered.lock().unwrap();
        assert!(!delivered.is_empty());

        // Whatever was delivered is a subsequence ending with the last
        // command, never reordered or stale
        assert_eq!(*delivered.last().unwrap(), 4.0);
        for pair in delivered.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
