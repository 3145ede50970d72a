//! # Motion configuration
//!
//! The base motion configuration is read from a properties file. Every path
//! starts from this configuration and may override individual fields.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::fmt;
use thiserror::Error;

// Internal
use util::params::Properties;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of samples used for the `HIGH` sample rate.
pub const SAMPLES_HIGH: usize = 100_000;

/// Number of samples used for the `LOW` sample rate.
pub const SAMPLES_LOW: usize = 10_000;

/// Number of samples used for the `FAST` sample rate.
pub const SAMPLES_FAST: usize = 1_000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A fully populated motion configuration.
///
/// All numeric fields are finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    /// Curve family fitted between waypoints.
    pub fit_method: FitMethod,

    /// Density used when integrating the length of each spline.
    pub sample_rate: SampleRate,

    /// Time between trajectory samples.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Maximum velocity along the path.
    ///
    /// Units: meters/second
    pub max_vel_ms: f64,

    /// Maximum acceleration along the path.
    ///
    /// Units: meters/second^2
    pub max_accel_mss: f64,

    /// Maximum jerk along the path.
    ///
    /// Units: meters/second^3
    pub max_jerk_msss: f64,

    /// Lateral distance between the left and right wheel tracks.
    ///
    /// Units: meters
    pub wheelbase_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Spline family used to interpolate between waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMethod {
    HermiteCubic,
    HermiteQuintic,
}

/// Sample density, either a named tier or an explicit sample count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    High,
    Low,
    Fast,
    Count(usize),
}

/// The fields of a [`MotionConfig`], named by their file key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigField {
    FitMethod,
    Samples,
    Dt,
    MaxVel,
    MaxAccel,
    MaxJerk,
    Wheelbase,
}

/// Errors raised while loading the base configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Property {0} not found in the properties file")]
    MissingProperty(ConfigField),

    #[error("{0} is not a valid fit method")]
    InvalidFitMethod(String),

    #[error("{0} is not a valid sample amount")]
    InvalidSampleRate(String),

    #[error("Property {field} has an invalid value \"{value}\", expected a positive number")]
    InvalidNumericValue {
        field: ConfigField,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionConfig {
    /// Build and validate the configuration from a set of properties.
    pub fn from_properties(props: &Properties) -> Result<Self, ConfigError> {
        let get = |field: ConfigField| {
            props
                .get(field.key())
                .ok_or(ConfigError::MissingProperty(field))
        };

        let fit_str = get(ConfigField::FitMethod)?;
        let fit_method = FitMethod::from_literal(fit_str)
            .ok_or_else(|| ConfigError::InvalidFitMethod(fit_str.to_string()))?;

        let samples_str = get(ConfigField::Samples)?;
        let sample_rate = SampleRate::from_literal(samples_str)
            .ok_or_else(|| ConfigError::InvalidSampleRate(samples_str.to_string()))?;

        let real = |field: ConfigField| -> Result<f64, ConfigError> {
            let value = get(field)?;
            value
                .parse::<f64>()
                .ok()
                .filter(|v| is_positive_real(*v))
                .ok_or_else(|| ConfigError::InvalidNumericValue {
                    field,
                    value: value.to_string(),
                })
        };

        Ok(MotionConfig {
            fit_method,
            sample_rate,
            dt_s: real(ConfigField::Dt)?,
            max_vel_ms: real(ConfigField::MaxVel)?,
            max_accel_mss: real(ConfigField::MaxAccel)?,
            max_jerk_msss: real(ConfigField::MaxJerk)?,
            wheelbase_m: real(ConfigField::Wheelbase)?,
        })
    }
}

impl FitMethod {
    /// Parse a fit method from its file literal.
    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "HERMITE_CUBIC" => Some(FitMethod::HermiteCubic),
            "HERMITE_QUINTIC" => Some(FitMethod::HermiteQuintic),
            _ => None,
        }
    }

    /// The file literal of this fit method.
    pub fn as_literal(&self) -> &'static str {
        match self {
            FitMethod::HermiteCubic => "HERMITE_CUBIC",
            FitMethod::HermiteQuintic => "HERMITE_QUINTIC",
        }
    }
}

impl fmt::Display for FitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_literal())
    }
}

impl SampleRate {
    /// Parse a sample rate from either a tier name or a positive integer.
    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "HIGH" => Some(SampleRate::High),
            "LOW" => Some(SampleRate::Low),
            "FAST" => Some(SampleRate::Fast),
            _ => s
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(SampleRate::Count),
        }
    }

    /// The number of samples this rate stands for.
    pub fn sample_count(&self) -> usize {
        match self {
            SampleRate::High => SAMPLES_HIGH,
            SampleRate::Low => SAMPLES_LOW,
            SampleRate::Fast => SAMPLES_FAST,
            SampleRate::Count(n) => *n,
        }
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleRate::High => write!(f, "HIGH"),
            SampleRate::Low => write!(f, "LOW"),
            SampleRate::Fast => write!(f, "FAST"),
            SampleRate::Count(n) => write!(f, "{}", n),
        }
    }
}

impl ConfigField {
    /// Every field, in file order.
    pub const ALL: [ConfigField; 7] = [
        ConfigField::FitMethod,
        ConfigField::Samples,
        ConfigField::Dt,
        ConfigField::MaxVel,
        ConfigField::MaxAccel,
        ConfigField::MaxJerk,
        ConfigField::Wheelbase,
    ];

    /// The key of this field in both the properties file and path objects.
    pub fn key(&self) -> &'static str {
        match self {
            ConfigField::FitMethod => "fitMethod",
            ConfigField::Samples => "samples",
            ConfigField::Dt => "dt",
            ConfigField::MaxVel => "maxVel",
            ConfigField::MaxAccel => "maxAccel",
            ConfigField::MaxJerk => "maxJerk",
            ConfigField::Wheelbase => "wheelbase",
        }
    }

    /// Find the field with the given key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key)
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// `true` if the value is usable as a time step, limit or width.
pub fn is_positive_real(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod test {
    use super::*;

    const VALID: &str = "fitMethod=HERMITE_CUBIC\n\
                         samples=HIGH\n\
                         dt=0.02\n\
                         maxVel=4\n\
                         maxAccel=3\n\
                         maxJerk=60\n\
                         wheelbase=0.6\n";

    fn parse(source: &str) -> Result<MotionConfig, ConfigError> {
        MotionConfig::from_properties(&Properties::parse(source))
    }

    #[test]
    fn test_valid_config() {
        let config = parse(VALID).unwrap();

        assert_eq!(
            config,
            MotionConfig {
                fit_method: FitMethod::HermiteCubic,
                sample_rate: SampleRate::High,
                dt_s: 0.02,
                max_vel_ms: 4.0,
                max_accel_mss: 3.0,
                max_jerk_msss: 60.0,
                wheelbase_m: 0.6,
            }
        );
        assert_eq!(config.sample_rate.sample_count(), SAMPLES_HIGH);
    }

    #[test]
    fn test_missing_property() {
        for field in ConfigField::ALL.iter() {
            let source: String = VALID
                .lines()
                .filter(|l| !l.starts_with(&format!("{}=", field.key())))
                .map(|l| format!("{}\n", l))
                .collect();

            match parse(&source) {
                Err(ConfigError::MissingProperty(f)) => assert_eq!(f, *field),
                other => panic!("Expected missing {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_invalid_fit_method() {
        let source = VALID.replace("HERMITE_CUBIC", "BEZIER");

        match parse(&source) {
            Err(ConfigError::InvalidFitMethod(s)) => assert_eq!(s, "BEZIER"),
            other => panic!("Expected invalid fit method, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_rates() {
        assert_eq!(SampleRate::from_literal("LOW"), Some(SampleRate::Low));
        assert_eq!(SampleRate::from_literal("FAST"), Some(SampleRate::Fast));
        assert_eq!(SampleRate::from_literal("2500"), Some(SampleRate::Count(2500)));
        assert_eq!(SampleRate::from_literal("0"), None);
        assert_eq!(SampleRate::from_literal("-10"), None);
        assert_eq!(SampleRate::from_literal("high"), None);

        let source = VALID.replace("samples=HIGH", "samples=LOTS");
        match parse(&source) {
            Err(ConfigError::InvalidSampleRate(s)) => assert_eq!(s, "LOTS"),
            other => panic!("Expected invalid sample rate, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_numeric_values() {
        for bad in &["maxVel=fast", "maxVel=-4", "maxVel=0", "maxVel=NaN", "maxVel=inf"] {
            let source = VALID.replace("maxVel=4", bad);

            match parse(&source) {
                Err(ConfigError::InvalidNumericValue { field, .. }) => {
                    assert_eq!(field, ConfigField::MaxVel)
                }
                other => panic!("Expected invalid numeric value for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_config_field_keys() {
        for field in ConfigField::ALL.iter() {
            assert_eq!(ConfigField::from_key(field.key()), Some(*field));
        }
        assert_eq!(ConfigField::from_key("points"), None);
    }
}
