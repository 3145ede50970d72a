//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable which may point at the directory holding the input
/// files.
pub const ROOT_ENV_VAR: &str = "PROFILE_GEN_ROOT";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory the generator works in.
///
/// This is the `PROFILE_GEN_ROOT` environment variable if set, otherwise the
/// current working directory.
pub fn get_root() -> std::io::Result<PathBuf> {
    match env::var_os(ROOT_ENV_VAR) {
        Some(r) if !r.is_empty() => Ok(PathBuf::from(r)),
        _ => env::current_dir(),
    }
}
