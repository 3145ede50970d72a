//! One dimensional velocity profile along the path.
//!
//! The profile is produced by passing a velocity impulse through two moving
//! average filters. The first filter's length sets the time to reach maximum
//! velocity (acceleration limit), the second the time to reach maximum
//! acceleration (jerk limit).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::Segment;
use crate::motion_config::MotionConfig;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Filter sizing for a profile of a given length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ProfileInfo {
    /// Length of the acceleration filter in samples
    pub filter_1_len: usize,

    /// Length of the jerk filter in samples
    pub filter_2_len: usize,

    /// Number of samples in the whole profile
    pub num_samples: usize,

    /// Peak velocity actually reached, may be below the configured maximum on
    /// short paths.
    pub max_vel_ms: f64,

    /// Length of the velocity impulse in samples
    pub impulse: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Size the filters for a path of the given length.
pub(crate) fn prepare(length_m: f64, config: &MotionConfig) -> ProfileInfo {
    let max_a = config.max_accel_mss;
    let max_j = config.max_jerk_msss;
    let max_a2 = max_a * max_a;
    let max_j2 = max_j * max_j;

    // Largest velocity for which the jerk-limited ramp up and down still fits
    // inside the path length
    let reachable_v = (-max_a2 + (max_a2 * max_a2 + 4.0 * max_j2 * max_a * length_m).sqrt())
        / (2.0 * max_j);
    let max_vel_ms = config.max_vel_ms.min(reachable_v);

    let filter_1_len = ((max_vel_ms / max_a) / config.dt_s).ceil().max(1.0) as usize;
    let filter_2_len = ((max_a / max_j) / config.dt_s).ceil().max(1.0) as usize;

    let impulse = (length_m / max_vel_ms) / config.dt_s;
    let num_samples = (filter_1_len as f64 + filter_2_len as f64 + impulse).ceil() as usize;

    ProfileInfo {
        filter_1_len,
        filter_2_len,
        num_samples,
        max_vel_ms,
        impulse,
    }
}

/// Build the profile for a path of the given length.
///
/// Each returned segment carries `position` (also copied into `x`),
/// `velocity`, `acceleration`, `jerk` and `dt`. `y` and `heading` are left at
/// zero for the caller to fill from the path geometry.
pub(crate) fn second_order_filter(length_m: f64, config: &MotionConfig) -> Vec<Segment> {
    // A zero length path is a single stationary sample
    if !(length_m > 0.0) {
        return vec![Segment {
            dt: config.dt_s,
            ..Segment::default()
        }];
    }

    let info = prepare(length_m, config);

    let dt = config.dt_s;
    let f1_len = info.filter_1_len as f64;
    let mut impulse = info.impulse;

    let mut f1_buffer: Vec<f64> = Vec::with_capacity(info.num_samples);
    let mut segments: Vec<Segment> = Vec::with_capacity(info.num_samples);
    let mut last = Segment {
        dt,
        ..Segment::default()
    };

    for i in 0..info.num_samples {
        // Feed whole samples of the impulse in, then the remainder, then drain
        let mut input = impulse.min(1.0);
        if input < 1.0 {
            input -= 1.0;
            impulse = 0.0;
        } else {
            impulse -= input;
        }

        let f1_last = f1_buffer.last().copied().unwrap_or(0.0);
        f1_buffer.push((f1_last + input).min(f1_len).max(0.0));

        // Second filter is the moving sum of the first over its length
        let f2: f64 = f1_buffer[i.saturating_sub(info.filter_2_len - 1)..=i]
            .iter()
            .sum::<f64>()
            / f1_len;

        let velocity = f2 / info.filter_2_len as f64 * info.max_vel_ms;
        let position = (last.velocity + velocity) / 2.0 * dt + last.position;
        let acceleration = (velocity - last.velocity) / dt;
        let jerk = (acceleration - last.acceleration) / dt;

        let seg = Segment {
            dt,
            x: position,
            y: 0.0,
            position,
            velocity,
            acceleration,
            jerk,
            heading: 0.0,
        };

        segments.push(seg);
        last = seg;
    }

    segments
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::motion_config::{FitMethod, SampleRate};
    use approx::assert_abs_diff_eq;

    fn config() -> MotionConfig {
        MotionConfig {
            fit_method: FitMethod::HermiteCubic,
            sample_rate: SampleRate::Fast,
            dt_s: 0.02,
            max_vel_ms: 4.0,
            max_accel_mss: 3.0,
            max_jerk_msss: 60.0,
            wheelbase_m: 0.6,
        }
    }

    #[test]
    fn test_prepare_short_path_limits_velocity() {
        let info = prepare(5.0, &config());

        // Not enough room to reach 4 m/s in 5 m at 3 m/s^2
        assert!(info.max_vel_ms < 4.0);
        assert!(info.max_vel_ms > 3.5);
        assert_eq!(info.filter_2_len, 3);
    }

    #[test]
    fn test_prepare_long_path_reaches_max_velocity() {
        let info = prepare(100.0, &config());

        assert_eq!(info.max_vel_ms, 4.0);
        assert_eq!(info.filter_1_len, 67);
    }

    #[test]
    fn test_profile_covers_length() {
        let cfg = config();

        for length in &[0.5, 5.0, 42.0] {
            let segs = second_order_filter(*length, &cfg);
            let last = segs.last().unwrap();

            assert_abs_diff_eq!(last.position, *length, epsilon = 1e-6);
            assert_abs_diff_eq!(last.velocity, 0.0, epsilon = 1e-9);
            assert!(segs[0].velocity < segs[segs.len() / 2].velocity);
        }
    }

    #[test]
    fn test_zero_length_profile() {
        let segs = second_order_filter(0.0, &config());

        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].position, 0.0);
        assert_eq!(segs[0].velocity, 0.0);
    }

    #[test]
    fn test_profile_respects_limits() {
        let cfg = config();
        let segs = second_order_filter(20.0, &cfg);

        let mut last_position = 0.0;
        for s in &segs {
            assert!(s.velocity >= 0.0);
            assert!(s.velocity <= cfg.max_vel_ms + 1e-9);
            assert!(s.acceleration.abs() <= cfg.max_accel_mss + 1e-6);
            assert!(s.position >= last_position);
            assert_eq!(s.dt, cfg.dt_s);
            last_position = s.position;
        }
    }
}
