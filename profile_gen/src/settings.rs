//! # Tool settings
//!
//! Where the generator finds its inputs and puts its outputs. Settings are
//! read from an optional `profile_gen.toml` in the root directory, every field
//! falling back to its default if not given. Command line flags are applied on
//! top by the executable.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// Internal
use util::params::{self, LoadError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the settings file looked for in the root directory.
pub const SETTINGS_FILE_NAME: &str = "profile_gen.toml";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Settings of the generator. Relative paths are relative to the root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// The base motion configuration
    pub properties_file: PathBuf,

    /// The path definitions document
    pub paths_file: PathBuf,

    /// Hash record of the last successful run
    pub cache_file: PathBuf,

    /// Directory the CSV files are written to
    pub output_dir: PathBuf,

    /// If true output is written to the root, ignoring `output_dir`
    pub flat_output: bool,

    /// Directory for log files, no log file is written if `None`
    pub log_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Settings {
    fn default() -> Self {
        Self {
            properties_file: PathBuf::from("trajectory.properties"),
            paths_file: PathBuf::from("profiles.json"),
            cache_file: PathBuf::from("profileSettingsHashes.txt"),
            output_dir: PathBuf::from("generated"),
            flat_output: false,
            log_dir: None,
        }
    }
}

impl Settings {
    /// Load the settings.
    ///
    /// An explicit settings file must exist. Otherwise `profile_gen.toml` in
    /// the root is used if present, and the defaults if not.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, LoadError> {
        match explicit {
            Some(path) => {
                let path = root.join(path);
                debug!("Loading settings from {:?}", path);
                params::load(path)
            }
            None => {
                let path = root.join(SETTINGS_FILE_NAME);
                if path.is_file() {
                    debug!("Loading settings from {:?}", path);
                    params::load(path)
                } else {
                    debug!("No settings file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn properties_path(&self, root: &Path) -> PathBuf {
        root.join(&self.properties_file)
    }

    pub fn paths_path(&self, root: &Path) -> PathBuf {
        root.join(&self.paths_file)
    }

    pub fn cache_path(&self, root: &Path) -> PathBuf {
        root.join(&self.cache_file)
    }

    /// The directory output files are written to.
    pub fn output_root(&self, root: &Path) -> PathBuf {
        if self.flat_output {
            root.to_path_buf()
        } else {
            root.join(&self.output_dir)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path(), None).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(
            settings.output_root(dir.path()),
            dir.path().join("generated")
        );
        assert_eq!(
            settings.properties_path(dir.path()),
            dir.path().join("trajectory.properties")
        );
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE_NAME),
            "paths_file = \"paths/auto.json\"\nflat_output = true\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path(), None).unwrap();

        assert_eq!(settings.paths_file, PathBuf::from("paths/auto.json"));
        assert_eq!(settings.cache_file, Settings::default().cache_file);
        assert_eq!(settings.output_root(dir.path()), dir.path().to_path_buf());
    }

    #[test]
    fn test_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("custom.toml"), "output_dir = \"out\"\n").unwrap();

        let settings = Settings::load(dir.path(), Some(Path::new("custom.toml"))).unwrap();
        assert_eq!(settings.output_root(dir.path()), dir.path().join("out"));

        match Settings::load(dir.path(), Some(Path::new("missing.toml"))) {
            Err(LoadError::FileLoadError(_)) => (),
            other => panic!("Expected a load error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE_NAME), "outptu_dir = \"x\"\n").unwrap();

        match Settings::load(dir.path(), None) {
            Err(LoadError::DeserialiseError(_)) => (),
            other => panic!("Expected a deserialise error, got {:?}", other),
        }
    }
}
