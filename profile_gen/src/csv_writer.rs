//! # CSV output
//!
//! Each path produces `{name}_left.csv` and `{name}_right.csv`, with the
//! columns `dt,x,y,position,velocity,acceleration,jerk,heading`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::traj_backend::{TankTrajectories, Trajectory};
use util::archive::{ArchiveError, Archiver};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The files written for one path.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenFiles {
    pub left: PathBuf,
    pub right: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Error writing a trajectory file.
#[derive(Debug, Error)]
pub enum CsvWriteError {
    #[error("Cannot write trajectory file: {0}")]
    Io(#[from] ArchiveError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The left and right file paths for the named path inside `out_dir`.
pub fn output_files(out_dir: &Path, name: &str) -> WrittenFiles {
    WrittenFiles {
        left: out_dir.join(format!("{}_left.csv", name)),
        right: out_dir.join(format!("{}_right.csv", name)),
    }
}

/// Write both wheel trajectories of a path into `out_dir`.
///
/// The directory must already exist.
pub fn write_path(
    out_dir: &Path,
    name: &str,
    tank: &TankTrajectories,
) -> Result<WrittenFiles, CsvWriteError> {
    let files = output_files(out_dir, name);

    write_trajectory(&files.left, &tank.left)?;
    write_trajectory(&files.right, &tank.right)?;

    debug!("Wrote {:?} and {:?}", files.left, files.right);

    Ok(files)
}

/// Write a single trajectory to a CSV file, one row per segment.
pub fn write_trajectory(path: &Path, trajectory: &Trajectory) -> Result<(), CsvWriteError> {
    let mut arch = Archiver::from_path(path)?;
    arch.serialise_all(trajectory.segments.iter())?;

    Ok(())
}
