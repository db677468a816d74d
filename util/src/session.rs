//! Session management
//!
//! A session is a single execution of one of the flight executables. Each
//! session gets its own timestamped directory under the software root, into
//! which the log file is written. The session epoch is process-global so
//! that the logger can timestamp records relative to the start of execution.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

// Internal imports
use crate::host;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A chrono format string used to timestamp session directories.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A struct storing information about the current session
#[derive(Clone)]
pub struct Session {
    /// The root directory for this session
    pub session_root: PathBuf,

    /// The path to the session's log file
    pub log_file_path: PathBuf
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(
        "The software root environment variable ({}) is not set",
        host::SW_ROOT_ENV_VAR
    )]
    SwRootNotSet,

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error(
        "Cannot initialise the session epoch, has a session already been \
         created in this process?"
    )]
    CannotInitEpoch,

    #[error("Cannot get the epoch time, did you forget to initialise the session?")]
    CannotGetEpoch
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start a new session within the given directory.
    ///
    /// This will create a new session directory named
    /// `{exec_name}_{timestamp}` under `{sw_root}/{sessions_dir}`.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        // Set the session epoch
        if SESSION_EPOCH.try_init_once(Utc::now).is_err() {
            return Err(SessionError::CannotInitEpoch)
        }

        // Format the session epoch as a timestamp
        let timestamp = match SESSION_EPOCH.get() {
            Some(e) => e.format(TIMESTAMP_FORMAT),
            None => return Err(SessionError::CannotGetEpoch)
        };

        // Build the session path under the software root
        let mut path = host::get_sw_root().ok_or(SessionError::SwRootNotSet)?;
        path.push(sessions_dir);
        path.push(format!("{}_{}", exec_name, timestamp));

        // Create the directory
        fs::create_dir_all(&path).map_err(SessionError::CannotCreateDir)?;

        // Create the log file path
        let mut log_file_path = path.clone();
        log_file_path.push(format!("{}.log", exec_name));

        Ok(Session {
            session_root: path,
            log_file_path
        })
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the number of seconds elapsed since the start of the session.
///
/// Returns zero if no session has been initialised, so that logging remains
/// usable in contexts (such as unit tests) which never create a session.
pub fn get_elapsed_seconds() -> f64 {
    match SESSION_EPOCH.get() {
        Some(e) => {
            let elapsed = Utc::now() - *e;
            match elapsed.num_nanoseconds() {
                Some(ns) => ns as f64 * 1e-9,
                None => f64::NAN
            }
        }
        None => 0f64
    }
}

/// Return a reference to the session's epoch.
pub fn get_epoch() -> Result<&'static DateTime<Utc>, SessionError> {
    SESSION_EPOCH.get().ok_or(SessionError::CannotGetEpoch)
}
