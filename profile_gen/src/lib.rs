//! # Profile generator library.
//!
//! Turns a set of named robot paths and a base motion configuration into
//! left and right wheel motion profiles for a tank drive robot, skipping the
//! work when neither input changed since the last run.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Change detection - input hashing and the hash record of the last run
pub mod change_detect;

/// CSV writer - writes wheel trajectories to disk
pub mod csv_writer;

/// Motion configuration - the base configuration and its properties file
pub mod motion_config;

/// Path specifications - parses path definitions and resolves their overrides
pub mod path_spec;

/// Pipeline - runs change detection, generation and output in order
pub mod pipeline;

/// Post processing - reverses flipped paths
pub mod post_proc;

/// Settings - input and output locations of the generator
pub mod settings;

/// Trajectory backend - fits, samples and splits trajectories
pub mod traj_backend;
