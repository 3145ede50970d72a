//! Hermite spline trajectory backend
//!
//! A spline is fitted between each pair of consecutive waypoints in the frame
//! of the chord joining them, so that each spline is a polynomial `y(x)` with
//! `x` running from zero to the chord length. The velocity profile is then
//! laid along the total arc length and each sample is mapped back onto the
//! spline it falls in.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::{Rotation2, Vector2};

// Internal
use super::{profile, BackendError, Trajectory, TrajectoryBackend, Waypoint};
use crate::motion_config::{FitMethod, MotionConfig};
use util::maths::{bound_radians, clamp};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Chords shorter than this are treated as coincident waypoints.
///
/// Units: meters
const MIN_KNOT_DISTANCE_M: f64 = 1e-9;

/// Largest number of arc length samples per spline. Each sample is stored,
/// so this bounds the memory used by a single spline.
pub const MAX_SAMPLE_COUNT: usize = 10_000_000;

/// Waypoint headings whose cosine relative to the chord is below this cannot
/// be expressed as a slope.
const MIN_HEADING_COS: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory backend fitting Hermite splines through the waypoints.
#[derive(Debug, Default, Clone, Copy)]
pub struct HermiteBackend;

/// A single spline between two waypoints.
///
/// In the chord frame `y(x) = a x^5 + b x^4 + c x^3 + d x^2 + e x`.
#[derive(Debug, Clone)]
pub(crate) struct Spline {
    offset: Vector2<f64>,
    rotation: Rotation2<f64>,
    angle_offset: f64,
    knot_distance: f64,
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,

    /// Cumulative arc length, normalised by the knot distance, at each of
    /// `sample_count + 1` evenly spaced parameter values.
    arc_table: Vec<f64>,

    /// Units: meters
    arc_length: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryBackend for HermiteBackend {
    fn generate(
        &self,
        waypoints: &[Waypoint],
        config: &MotionConfig,
    ) -> Result<Trajectory, BackendError> {
        if waypoints.len() < 2 {
            return Err(BackendError::TooFewWaypoints(waypoints.len()));
        }

        let sample_count = config.sample_rate.sample_count();
        if sample_count > MAX_SAMPLE_COUNT {
            return Err(BackendError::SampleCountTooLarge {
                count: sample_count,
                max: MAX_SAMPLE_COUNT,
            });
        }

        let splines = waypoints
            .windows(2)
            .enumerate()
            .map(|(i, pair)| Spline::fit(i, &pair[0], &pair[1], config.fit_method, sample_count))
            .collect::<Result<Vec<_>, _>>()?;

        let total_length_m: f64 = splines.iter().map(|s| s.arc_length).sum();

        trace!(
            "Fitted {} splines, total length {:.4} m",
            splines.len(),
            total_length_m
        );

        let mut segments = profile::second_order_filter(total_length_m, config);

        // Walk the profile along the splines, both are ordered by distance
        let mut spline_i = 0;
        let mut spline_start_m = 0.0;

        for seg in segments.iter_mut() {
            let progress = loop {
                let spline = &splines[spline_i];
                let relative_m = seg.position - spline_start_m;

                if relative_m <= spline.arc_length {
                    break spline.progress_for_distance(relative_m);
                } else if spline_i < splines.len() - 1 {
                    spline_start_m += spline.arc_length;
                    spline_i += 1;
                } else {
                    // Past the end through rounding, pin to the final point
                    break 1.0;
                }
            };

            let spline = &splines[spline_i];
            let coords = spline.coords(progress);
            seg.x = coords.x;
            seg.y = coords.y;
            seg.heading = spline.angle(progress);
        }

        Ok(Trajectory::new(segments))
    }
}

impl Spline {
    /// Fit a spline between two waypoints.
    ///
    /// `index` is the index of `start` in the waypoint list, used for error
    /// reporting.
    pub(crate) fn fit(
        index: usize,
        start: &Waypoint,
        end: &Waypoint,
        method: FitMethod,
        sample_count: usize,
    ) -> Result<Self, BackendError> {
        let offset = Vector2::new(start.x_m, start.y_m);
        let chord = Vector2::new(end.x_m, end.y_m) - offset;
        let knot_distance = chord.norm();

        if knot_distance < MIN_KNOT_DISTANCE_M {
            return Err(BackendError::DegenerateSegment(index));
        }

        let angle_offset = chord.y.atan2(chord.x);

        let slope = |wp: &Waypoint, wp_index: usize| {
            let rel = bound_radians(wp.angle_rad - angle_offset);
            if rel.cos().abs() < MIN_HEADING_COS {
                Err(BackendError::InvalidHeading(wp_index))
            } else {
                Ok(rel.tan())
            }
        };

        let a0 = slope(start, index)?;
        let a1 = slope(end, index + 1)?;
        let k = knot_distance;

        let (a, b, c, d, e) = match method {
            FitMethod::HermiteCubic => (
                0.0,
                0.0,
                (a0 + a1) / (k * k),
                -(2.0 * a0 + a1) / k,
                a0,
            ),
            FitMethod::HermiteQuintic => (
                -(3.0 * (a0 + a1)) / (k * k * k * k),
                (8.0 * a0 + 7.0 * a1) / (k * k * k),
                -(6.0 * a0 + 4.0 * a1) / (k * k),
                0.0,
                a0,
            ),
        };

        let mut spline = Spline {
            offset,
            rotation: Rotation2::new(angle_offset),
            angle_offset,
            knot_distance,
            a,
            b,
            c,
            d,
            e,
            arc_table: Vec::new(),
            arc_length: 0.0,
        };

        spline.build_arc_table(sample_count.max(1));

        Ok(spline)
    }

    /// Slope `dy/dx` of the spline at the given progress through it.
    fn deriv(&self, progress: f64) -> f64 {
        let x = progress * self.knot_distance;

        (5.0 * self.a * x + 4.0 * self.b) * x * x * x
            + (3.0 * self.c * x + 2.0 * self.d) * x
            + self.e
    }

    /// World coordinates of the point at the given progress through the
    /// spline.
    pub(crate) fn coords(&self, progress: f64) -> Vector2<f64> {
        let x = clamp(&progress, &0.0, &1.0) * self.knot_distance;
        let y = (self.a * x + self.b) * x.powi(4) + (self.c * x + self.d) * x * x + self.e * x;

        self.offset + self.rotation * Vector2::new(x, y)
    }

    /// World heading of the spline at the given progress, in `[0, 2pi)`.
    pub(crate) fn angle(&self, progress: f64) -> f64 {
        bound_radians(self.deriv(progress).atan() + self.angle_offset)
    }

    /// Length of the spline in meters.
    pub(crate) fn arc_length(&self) -> f64 {
        self.arc_length
    }

    /// Find the progress through the spline at which the given distance along
    /// it is reached.
    pub(crate) fn progress_for_distance(&self, distance_m: f64) -> f64 {
        let target = distance_m / self.knot_distance;
        let n = self.arc_table.len() - 1;

        // First table entry at or beyond the target
        let upper = self.arc_table.partition_point(|l| *l < target);

        if upper == 0 {
            return 0.0;
        }
        if upper > n {
            return 1.0;
        }

        let lower_len = self.arc_table[upper - 1];
        let upper_len = self.arc_table[upper];
        let frac = if upper_len > lower_len {
            (target - lower_len) / (upper_len - lower_len)
        } else {
            0.0
        };

        clamp(&(((upper - 1) as f64 + frac) / n as f64), &0.0, &1.0)
    }

    /// Integrate the arc length with the trapezium rule.
    fn build_arc_table(&mut self, sample_count: usize) {
        let n = sample_count as f64;
        let integrand = |t: f64| {
            let dydx = self.deriv(t);
            (1.0 + dydx * dydx).sqrt()
        };

        let mut table = Vec::with_capacity(sample_count + 1);
        table.push(0.0);

        let mut last = integrand(0.0);
        let mut total = 0.0;
        for i in 1..=sample_count {
            let current = integrand(i as f64 / n);
            total += (current + last) / 2.0 / n;
            table.push(total);
            last = current;
        }

        self.arc_length = total * self.knot_distance;
        self.arc_table = table;
    }
}
