//! # Path specifications
//!
//! The path definitions document is a JSON object mapping path names to path
//! objects:
//!
//! ```json
//! {
//!     "straight": {
//!         "flip": false,
//!         "maxVel": 2.5,
//!         "points": [
//!             { "x": 0, "y": 0, "angle": 0 },
//!             { "x": 5, "y": 0, "angle": 0 }
//!         ]
//!     }
//! }
//! ```
//!
//! `flip` and `points` are mandatory and any fault in them is fatal. The
//! remaining keys override the base configuration for that path only; an
//! override with the wrong type or an unknown value is dropped with a
//! warning and the base value is used instead.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

// Internal
use crate::motion_config::{is_positive_real, ConfigField, FitMethod, MotionConfig, SampleRate};
use crate::traj_backend::Waypoint;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Key of the flip flag in a path object.
pub const FLIP_KEY: &str = "flip";

/// Key of the waypoint array in a path object.
pub const POINTS_KEY: &str = "points";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A path with its configuration fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    /// Name of the path, also the stem of its output files
    pub name: String,

    /// Ordered waypoints, never empty
    pub waypoints: Vec<Waypoint>,

    /// Whether the path is driven in reverse
    pub flip: bool,

    /// The base configuration with this path's overrides applied
    pub config: MotionConfig,

    /// Overrides that were applied, in field order
    pub applied: Vec<Override>,

    /// Overrides that were discarded
    pub warnings: Vec<OverrideWarning>,
}

/// A discarded override.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideWarning {
    pub path: String,
    pub field: ConfigField,
    pub value: Value,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A valid override of a single configuration field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Override {
    FitMethod(FitMethod),
    Samples(SampleRate),
    Dt(f64),
    MaxVel(f64),
    MaxAccel(f64),
    MaxJerk(f64),
    Wheelbase(f64),
}

/// Fatal errors in the path definitions document.
#[derive(Debug, Error)]
pub enum PathSpecError {
    #[error("The path definitions are not valid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("The path definitions must be a JSON object of named paths")]
    InvalidDocument,

    #[error("Item at key {0} is not a valid JSON object")]
    NotAnObject(String),

    #[error("Path name {0:?} cannot be used as a file name")]
    InvalidPathName(String),

    #[error("Parameter \"{param}\" in path {path} is missing or invalid")]
    MissingOrInvalidParameter {
        param: &'static str,
        path: String,
    },

    #[error("Parameters in path {path} point {index} are missing or invalid")]
    InvalidWaypoint {
        path: String,
        index: usize,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Override {
    /// The field this override replaces.
    pub fn field(&self) -> ConfigField {
        match self {
            Override::FitMethod(_) => ConfigField::FitMethod,
            Override::Samples(_) => ConfigField::Samples,
            Override::Dt(_) => ConfigField::Dt,
            Override::MaxVel(_) => ConfigField::MaxVel,
            Override::MaxAccel(_) => ConfigField::MaxAccel,
            Override::MaxJerk(_) => ConfigField::MaxJerk,
            Override::Wheelbase(_) => ConfigField::Wheelbase,
        }
    }

    /// Write this override into the configuration.
    pub fn apply(&self, config: &mut MotionConfig) {
        match *self {
            Override::FitMethod(m) => config.fit_method = m,
            Override::Samples(s) => config.sample_rate = s,
            Override::Dt(v) => config.dt_s = v,
            Override::MaxVel(v) => config.max_vel_ms = v,
            Override::MaxAccel(v) => config.max_accel_mss = v,
            Override::MaxJerk(v) => config.max_jerk_msss = v,
            Override::Wheelbase(v) => config.wheelbase_m = v,
        }
    }
}

impl fmt::Display for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Override::FitMethod(m) => write!(f, "{}", m),
            Override::Samples(s) => write!(f, "{}", s),
            Override::Dt(v)
            | Override::MaxVel(v)
            | Override::MaxAccel(v)
            | Override::MaxJerk(v)
            | Override::Wheelbase(v) => write!(f, "{}", v),
        }
    }
}

impl fmt::Display for OverrideWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is not a valid {} for path {}, reverting to default",
            self.value, self.field, self.path
        )
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Resolve every path in a path definitions document.
///
/// Paths are returned sorted by name. The first structural error aborts the
/// whole document.
pub fn resolve_paths(
    source: &[u8],
    base: &MotionConfig,
) -> Result<Vec<ResolvedPath>, PathSpecError> {
    let doc: Value = serde_json::from_slice(source).map_err(PathSpecError::InvalidJson)?;

    let entries = match doc {
        Value::Object(m) => m,
        _ => return Err(PathSpecError::InvalidDocument),
    };

    let mut paths = entries
        .iter()
        .map(|(name, value)| resolve_path(name, value, base))
        .collect::<Result<Vec<_>, _>>()?;

    paths.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(paths)
}

/// Resolve a single path object against the base configuration.
pub fn resolve_path(
    name: &str,
    value: &Value,
    base: &MotionConfig,
) -> Result<ResolvedPath, PathSpecError> {
    if !is_valid_name(name) {
        return Err(PathSpecError::InvalidPathName(name.to_string()));
    }

    let obj = value
        .as_object()
        .ok_or_else(|| PathSpecError::NotAnObject(name.to_string()))?;

    let flip = obj
        .get(FLIP_KEY)
        .and_then(Value::as_bool)
        .ok_or_else(|| PathSpecError::MissingOrInvalidParameter {
            param: FLIP_KEY,
            path: name.to_string(),
        })?;

    let waypoints = parse_waypoints(name, obj)?;

    let mut config = *base;
    let mut applied = Vec::new();
    let mut warnings = Vec::new();

    for field in ConfigField::ALL.iter() {
        let raw = match obj.get(field.key()) {
            Some(v) => v,
            None => continue,
        };

        match coerce_override(*field, raw) {
            Some(o) => {
                info!("Overriding {} for path {} with value {}", field, name, o);
                o.apply(&mut config);
                applied.push(o);
            }
            None => {
                let warning = OverrideWarning {
                    path: name.to_string(),
                    field: *field,
                    value: raw.clone(),
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    for key in obj.keys() {
        if key != FLIP_KEY && key != POINTS_KEY && ConfigField::from_key(key).is_none() {
            debug!("Ignoring unknown key \"{}\" in path {}", key, name);
        }
    }

    Ok(ResolvedPath {
        name: name.to_string(),
        waypoints,
        flip,
        config,
        applied,
        warnings,
    })
}

/// Coerce a raw JSON override into a typed override, or `None` if the value
/// is not acceptable for the field.
///
/// Accepted shapes:
/// - `fitMethod`: the strings `HERMITE_CUBIC` or `HERMITE_QUINTIC`
/// - `samples`: the strings `HIGH`, `LOW`, `FAST` or a positive integer
///   string, or a positive integer
/// - all other fields: any finite, positive number
pub fn coerce_override(field: ConfigField, value: &Value) -> Option<Override> {
    match field {
        ConfigField::FitMethod => coerce_fit_method(value).map(Override::FitMethod),
        ConfigField::Samples => coerce_sample_rate(value).map(Override::Samples),
        ConfigField::Dt => coerce_positive_real(value).map(Override::Dt),
        ConfigField::MaxVel => coerce_positive_real(value).map(Override::MaxVel),
        ConfigField::MaxAccel => coerce_positive_real(value).map(Override::MaxAccel),
        ConfigField::MaxJerk => coerce_positive_real(value).map(Override::MaxJerk),
        ConfigField::Wheelbase => coerce_positive_real(value).map(Override::Wheelbase),
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Names become file stems, so they must not be able to leave the output
/// directory.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c: char| c == '/' || c == '\\' || c == '\0')
}

fn coerce_fit_method(value: &Value) -> Option<FitMethod> {
    value.as_str().and_then(FitMethod::from_literal)
}

fn coerce_sample_rate(value: &Value) -> Option<SampleRate> {
    match value {
        Value::String(s) => SampleRate::from_literal(s),
        Value::Number(n) => n
            .as_u64()
            .filter(|n| *n > 0)
            .map(|n| SampleRate::Count(n as usize)),
        _ => None,
    }
}

fn coerce_positive_real(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| is_positive_real(*v))
}

/// Parse the `points` array of a path object.
fn parse_waypoints(name: &str, obj: &Map<String, Value>) -> Result<Vec<Waypoint>, PathSpecError> {
    let points = obj
        .get(POINTS_KEY)
        .and_then(Value::as_array)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| PathSpecError::MissingOrInvalidParameter {
            param: POINTS_KEY,
            path: name.to_string(),
        })?;

    points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let coord = |key: &str| point.get(key).and_then(Value::as_f64);

            match (coord("x"), coord("y"), coord("angle")) {
                (Some(x), Some(y), Some(angle)) => Ok(Waypoint::new(x, y, angle)),
                _ => Err(PathSpecError::InvalidWaypoint {
                    path: name.to_string(),
                    index,
                }),
            }
        })
        .collect()
}
