//! # Trajectory backend
//!
//! The backend turns a list of waypoints into a time sampled trajectory, and
//! splits that trajectory into left and right wheel trajectories. Everything
//! else in the generator only talks to the [`TrajectoryBackend`] trait, so any
//! conforming fitting and profiling scheme may be substituted.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod hermite;
mod profile;
pub mod tank;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::motion_config::MotionConfig;

pub use hermite::{HermiteBackend, MAX_SAMPLE_COUNT};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point the path must pass through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    /// Units: meters
    pub x_m: f64,

    /// Units: meters
    pub y_m: f64,

    /// Heading of the path at this point.
    ///
    /// Units: radians
    pub angle_rad: f64,
}

/// A single sample of a trajectory.
///
/// Field names double as the CSV column names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Segment {
    /// Time step to the next sample, seconds
    pub dt: f64,
    pub x: f64,
    pub y: f64,
    /// Distance travelled along the path, meters
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub jerk: f64,
    /// Radians
    pub heading: f64,
}

/// An ordered, time sampled trajectory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    pub segments: Vec<Segment>,
}

/// The pair of wheel trajectories for a tank (skid steer) drive.
#[derive(Debug, Clone, PartialEq)]
pub struct TankTrajectories {
    pub left: Trajectory,
    pub right: Trajectory,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by a trajectory backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("At least two waypoints are needed to fit a path, found {0}")]
    TooFewWaypoints(usize),

    #[error("Waypoints {0} and {} are at the same position", .0 + 1)]
    DegenerateSegment(usize),

    #[error(
        "The heading of waypoint {0} is perpendicular to the line to its neighbour, \
        which cannot be fitted"
    )]
    InvalidHeading(usize),

    #[error("{count} samples per spline is more than the supported maximum of {max}")]
    SampleCountTooLarge {
        count: usize,
        max: usize,
    },
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trajectory generation capability.
pub trait TrajectoryBackend {
    /// Fit a path through the waypoints and sample it under the limits in
    /// `config`.
    fn generate(
        &self,
        waypoints: &[Waypoint],
        config: &MotionConfig,
    ) -> Result<Trajectory, BackendError>;

    /// Split a centreline trajectory into left and right wheel trajectories.
    fn tank_modify(&self, trajectory: &Trajectory, wheelbase_m: f64) -> TankTrajectories {
        tank::modify(trajectory, wheelbase_m)
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    pub fn new(x_m: f64, y_m: f64, angle_rad: f64) -> Self {
        Self { x_m, y_m, angle_rad }
    }
}

impl Trajectory {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total time covered by the trajectory in seconds.
    pub fn duration_s(&self) -> f64 {
        self.segments.iter().map(|s| s.dt).sum()
    }
}

// ---------------------------------------------------------------------------
// TEST BACKEND
// ---------------------------------------------------------------------------

/// A deterministic backend which emits one segment per waypoint, carrying the
/// configured limits as its kinematics. Lets the glue be tested without the
/// spline numerics.
#[cfg(test)]
pub(crate) struct FixedBackend;

#[cfg(test)]
impl TrajectoryBackend for FixedBackend {
    fn generate(
        &self,
        waypoints: &[Waypoint],
        config: &MotionConfig,
    ) -> Result<Trajectory, BackendError> {
        let mut position = 0.0;
        let mut last: Option<&Waypoint> = None;

        let segments = waypoints
            .iter()
            .map(|wp| {
                if let Some(prev) = last {
                    position += (wp.x_m - prev.x_m).hypot(wp.y_m - prev.y_m);
                }
                last = Some(wp);

                Segment {
                    dt: config.dt_s,
                    x: wp.x_m,
                    y: wp.y_m,
                    position,
                    velocity: config.max_vel_ms,
                    acceleration: config.max_accel_mss,
                    jerk: config.max_jerk_msss,
                    heading: wp.angle_rad,
                }
            })
            .collect();

        Ok(Trajectory::new(segments))
    }
}
