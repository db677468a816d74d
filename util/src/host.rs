//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable holding the path to the root of the software
/// directory, under which the `params` and `sessions` directories live.
pub const SW_ROOT_ENV_VAR: &str = "ICARUS_SW_ROOT";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the software root directory from the environment.
///
/// Returns `None` if the environment variable is not set or is not valid
/// unicode.
pub fn get_sw_root() -> Option<PathBuf> {
    std::env::var(SW_ROOT_ENV_VAR).ok().map(PathBuf::from)
}
