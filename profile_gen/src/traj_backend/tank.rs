//! Tank drive kinematic transform

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

use super::{Segment, TankTrajectories, Trajectory};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Split a centreline trajectory into left and right wheel trajectories.
///
/// Each wheel follows the centreline offset by half the wheelbase along the
/// heading normal, left being the positive side. Wheel kinematics are
/// re-derived from the distance each wheel actually covers between samples,
/// so the outside wheel of a turn runs faster than the inside one. Time
/// sampling is unchanged.
pub fn modify(trajectory: &Trajectory, wheelbase_m: f64) -> TankTrajectories {
    let half_width_m = wheelbase_m / 2.0;

    let mut left: Vec<Segment> = Vec::with_capacity(trajectory.len());
    let mut right: Vec<Segment> = Vec::with_capacity(trajectory.len());

    for seg in trajectory.segments.iter() {
        let centre = Vector2::new(seg.x, seg.y);
        let normal = Vector2::new(-seg.heading.sin(), seg.heading.cos());

        let l = offset_segment(seg, centre + normal * half_width_m, left.last());
        let r = offset_segment(seg, centre - normal * half_width_m, right.last());

        left.push(l);
        right.push(r);
    }

    TankTrajectories {
        left: Trajectory::new(left),
        right: Trajectory::new(right),
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Build a wheel segment at `position_m`, deriving its kinematics from the
/// previous wheel segment. The first segment keeps the centreline kinematics.
fn offset_segment(centre: &Segment, position_m: Vector2<f64>, last: Option<&Segment>) -> Segment {
    let mut seg = Segment {
        x: position_m.x,
        y: position_m.y,
        ..*centre
    };

    if let Some(last) = last {
        let distance_m = (position_m - Vector2::new(last.x, last.y)).norm();

        seg.position = last.position + distance_m;
        seg.velocity = distance_m / centre.dt;
        seg.acceleration = (seg.velocity - last.velocity) / centre.dt;
        seg.jerk = (seg.acceleration - last.acceleration) / centre.dt;
    }

    seg
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn seg(x: f64, y: f64, position: f64, heading: f64) -> Segment {
        Segment {
            dt: 0.1,
            x,
            y,
            position,
            velocity: 1.0,
            acceleration: 0.0,
            jerk: 0.0,
            heading,
        }
    }

    #[test]
    fn test_straight_offsets() {
        let traj = Trajectory::new(vec![
            seg(0.0, 0.0, 0.0, 0.0),
            seg(0.1, 0.0, 0.1, 0.0),
            seg(0.2, 0.0, 0.2, 0.0),
        ]);

        let tank = modify(&traj, 0.6);

        assert_eq!(tank.left.len(), 3);
        assert_eq!(tank.right.len(), 3);

        for (l, r) in tank.left.segments.iter().zip(tank.right.segments.iter()) {
            assert_eq!(l.x, r.x);
            assert_abs_diff_eq!(l.y, 0.3, epsilon = 1e-12);
            assert_abs_diff_eq!(r.y, -0.3, epsilon = 1e-12);
            assert_eq!(l.heading, 0.0);
            assert_eq!(l.dt, 0.1);
        }

        assert_abs_diff_eq!(tank.left.segments[2].position, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(tank.right.segments[2].velocity, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_turn_outer_wheel_faster() {
        // Quarter circle of radius 1 turning left
        let n = 20;
        let segments = (0..=n)
            .map(|i| {
                let theta = FRAC_PI_2 * i as f64 / n as f64;
                seg(theta.sin(), 1.0 - theta.cos(), theta, theta)
            })
            .collect();

        let tank = modify(&Trajectory::new(segments), 0.5);

        let left_len = tank.left.segments.last().unwrap().position;
        let right_len = tank.right.segments.last().unwrap().position;

        // Left wheel runs at radius 0.75, right at 1.25
        assert_abs_diff_eq!(left_len, 0.75 * FRAC_PI_2, epsilon = 1e-2);
        assert_abs_diff_eq!(right_len, 1.25 * FRAC_PI_2, epsilon = 1e-2);
        assert!(tank.right.segments[5].velocity > tank.left.segments[5].velocity);
    }
}
