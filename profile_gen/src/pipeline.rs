//! # Generation pipeline
//!
//! One run of the generator:
//!
//! 1. Check both input files exist and hash their contents
//! 2. Compare the hashes with the cache record and inspect the output
//!    directory, stopping early if nothing needs regenerating
//! 3. Load the base configuration and resolve every path
//! 4. Generate, tank-modify and post-process all paths in memory
//! 5. Write the CSV files, then the new cache record
//!
//! Nothing is written until every path has been generated, and the cache
//! record is only updated once every file has been written.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::change_detect::{self, CacheRecord, RegenReason, Regenerate};
use crate::csv_writer::{self, CsvWriteError, WrittenFiles};
use crate::motion_config::{ConfigError, MotionConfig};
use crate::path_spec::{self, PathSpecError, ResolvedPath};
use crate::post_proc;
use crate::settings::Settings;
use crate::traj_backend::{BackendError, TankTrajectories, TrajectoryBackend};
use util::params::Properties;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything a run needs to know.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory relative settings paths are resolved against
    pub root: PathBuf,

    pub settings: Settings,

    /// Regenerate even if the inputs are unchanged
    pub force: bool,
}

/// A path which was generated and written.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPath {
    pub name: String,
    pub files: WrittenFiles,

    /// Number of samples in each wheel trajectory
    pub num_segments: usize,

    /// Number of overrides which were discarded
    pub num_warnings: usize,
}

/// A path generated in memory but not yet written.
struct PendingPath {
    path: ResolvedPath,
    tank: TankTrajectories,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The inputs are unchanged and the outputs are present
    Skipped,

    /// All paths were regenerated
    Generated {
        reason: RegenReason,
        paths: Vec<GeneratedPath>,
    },
}

/// A fatal error during a run.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("Input file {0:?} does not exist")]
    MissingInputFile(PathBuf),

    #[error("Cannot read input file {0:?}: {1}")]
    InputReadError(PathBuf, std::io::Error),

    #[error("Input file {0:?} is not valid UTF-8: {1}")]
    InputEncodingError(PathBuf, std::str::Utf8Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    PathSpec(#[from] PathSpecError),

    #[error("Cannot generate path {name}: {source}")]
    Backend {
        name: String,
        source: BackendError,
    },

    #[error("Cannot create output directory {0:?}: {1}")]
    OutputDirError(PathBuf, std::io::Error),

    #[error(transparent)]
    CsvWrite(#[from] CsvWriteError),

    #[error("Cannot write hash record {0:?}: {1}")]
    CacheWriteError(PathBuf, std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GenError {
    /// The process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenError::MissingInputFile(_)
            | GenError::InputReadError(..)
            | GenError::InputEncodingError(..) => 2,
            GenError::Config(e) => match e {
                ConfigError::MissingProperty(_) => 3,
                ConfigError::InvalidFitMethod(_) => 4,
                ConfigError::InvalidSampleRate(_) => 5,
                ConfigError::InvalidNumericValue { .. } => 6,
            },
            GenError::PathSpec(e) => match e {
                PathSpecError::MissingOrInvalidParameter { .. } => 7,
                PathSpecError::InvalidWaypoint { .. } => 8,
                PathSpecError::InvalidJson(_)
                | PathSpecError::InvalidDocument
                | PathSpecError::NotAnObject(_)
                | PathSpecError::InvalidPathName(_) => 10,
            },
            GenError::OutputDirError(..)
            | GenError::CsvWrite(_)
            | GenError::CacheWriteError(..) => 9,
            GenError::Backend { .. } => 11,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the generator once.
pub fn run(opts: &RunOptions, backend: &dyn TrajectoryBackend) -> Result<RunOutcome, GenError> {
    let root = opts.root.as_path();
    let properties_path = opts.settings.properties_path(root);
    let paths_path = opts.settings.paths_path(root);
    let cache_path = opts.settings.cache_path(root);
    let out_dir = opts.settings.output_root(root);

    // ---- CHANGE DETECTION ----

    let properties_src = read_input(&properties_path)?;
    let paths_src = read_input(&paths_path)?;

    let record = CacheRecord::from_contents(&properties_src, &paths_src);
    debug!(
        "Input hashes: properties {}, paths {}",
        record.properties_hash, record.paths_hash
    );

    let reason = if opts.force {
        RegenReason::Forced
    } else {
        let old = CacheRecord::read(&cache_path);
        let out_state = change_detect::inspect_output_dir(&out_dir);

        match change_detect::should_regenerate(old.as_ref(), &record, out_state) {
            Regenerate::Skip => {
                info!("Inputs unchanged and outputs present, nothing to generate");
                return Ok(RunOutcome::Skipped);
            }
            Regenerate::Required(r) => r,
        }
    };

    info!("Regenerating profiles: {}", reason);

    // ---- RESOLUTION ----

    let properties_str = std::str::from_utf8(&properties_src)
        .map_err(|e| GenError::InputEncodingError(properties_path.clone(), e))?;
    let base = MotionConfig::from_properties(&Properties::parse(&properties_str))?;
    info!(
        "Base configuration: {} with {} samples, dt {} s, limits {}/{}/{}, wheelbase {} m",
        base.fit_method,
        base.sample_rate,
        base.dt_s,
        base.max_vel_ms,
        base.max_accel_mss,
        base.max_jerk_msss,
        base.wheelbase_m
    );

    let paths = path_spec::resolve_paths(&paths_src, &base)?;
    if paths.is_empty() {
        warn!("No paths defined in {:?}", paths_path);
    }

    // ---- GENERATION ----

    let pending = paths
        .into_iter()
        .map(|path| generate_path(path, backend))
        .collect::<Result<Vec<_>, _>>()?;

    // ---- OUTPUT ----

    fs::create_dir_all(&out_dir).map_err(|e| GenError::OutputDirError(out_dir.clone(), e))?;

    let mut generated = Vec::with_capacity(pending.len());
    for p in pending {
        let files = csv_writer::write_path(&out_dir, &p.path.name, &p.tank)?;

        generated.push(GeneratedPath {
            name: p.path.name,
            files,
            num_segments: p.tank.left.len(),
            num_warnings: p.path.warnings.len(),
        });
    }

    record
        .write(&cache_path)
        .map_err(|e| GenError::CacheWriteError(cache_path.clone(), e))?;

    info!("Generated {} paths into {:?}", generated.len(), out_dir);

    Ok(RunOutcome::Generated {
        reason,
        paths: generated,
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn read_input(path: &Path) -> Result<Vec<u8>, GenError> {
    if !path.is_file() {
        return Err(GenError::MissingInputFile(path.to_path_buf()));
    }

    fs::read(path).map_err(|e| GenError::InputReadError(path.to_path_buf(), e))
}

/// Generate, split and post-process a single path.
fn generate_path(
    path: ResolvedPath,
    backend: &dyn TrajectoryBackend,
) -> Result<PendingPath, GenError> {
    debug!(
        "Generating path {} ({} waypoints, flip {})",
        path.name,
        path.waypoints.len(),
        path.flip
    );

    let centre = backend
        .generate(&path.waypoints, &path.config)
        .map_err(|source| GenError::Backend {
            name: path.name.clone(),
            source,
        })?;

    let tank = backend.tank_modify(&centre, path.config.wheelbase_m);
    let tank = post_proc::apply_flip(tank, path.flip);

    info!(
        "Path {}: {} samples over {:.3} s",
        path.name,
        tank.left.len(),
        tank.left.duration_s()
    );

    Ok(PendingPath { path, tank })
}
