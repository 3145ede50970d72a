//! # Kinematic post-processing
//!
//! Paths flagged `flip` are driven in reverse. The wheel trajectories swap
//! sides and every distance and derivative changes sign. The time step and
//! the heading are kept, since the robot faces the same way while backing
//! along the path.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::traj_backend::{Segment, TankTrajectories, Trajectory};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Apply the flip transform if `flip` is set, otherwise return the
/// trajectories unchanged.
pub fn apply_flip(tank: TankTrajectories, flip: bool) -> TankTrajectories {
    if !flip {
        return tank;
    }

    TankTrajectories {
        left: negate(&tank.right),
        right: negate(&tank.left),
    }
}

/// Negate every distance and derivative of the trajectory.
pub fn negate(trajectory: &Trajectory) -> Trajectory {
    Trajectory::new(trajectory.segments.iter().map(negate_segment).collect())
}

/// Negate a segment's distances and derivatives, keeping `dt` and `heading`.
pub fn negate_segment(seg: &Segment) -> Segment {
    Segment {
        dt: seg.dt,
        x: -seg.x,
        y: -seg.y,
        position: -seg.position,
        velocity: -seg.velocity,
        acceleration: -seg.acceleration,
        jerk: -seg.jerk,
        heading: seg.heading,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tank() -> TankTrajectories {
        let left = Trajectory::new(vec![Segment {
            dt: 0.02,
            x: 1.0,
            y: 0.3,
            position: 1.0,
            velocity: 2.0,
            acceleration: 3.0,
            jerk: 4.0,
            heading: 0.5,
        }]);
        let right = Trajectory::new(vec![Segment {
            dt: 0.02,
            x: 1.0,
            y: -0.3,
            position: 1.5,
            velocity: 2.5,
            acceleration: -3.5,
            jerk: 4.5,
            heading: 0.5,
        }]);

        TankTrajectories { left, right }
    }

    #[test]
    fn test_no_flip_is_identity() {
        assert_eq!(apply_flip(tank(), false), tank());
    }

    #[test]
    fn test_flip_swaps_and_negates() {
        let original = tank();
        let flipped = apply_flip(tank(), true);

        let l = flipped.left.segments[0];
        let r = original.right.segments[0];
        assert_eq!(l.dt, r.dt);
        assert_eq!(l.x, -r.x);
        assert_eq!(l.y, -r.y);
        assert_eq!(l.position, -r.position);
        assert_eq!(l.velocity, -r.velocity);
        assert_eq!(l.acceleration, -r.acceleration);
        assert_eq!(l.jerk, -r.jerk);
        assert_eq!(l.heading, r.heading);

        assert_eq!(flipped.right, negate(&original.left));
    }

    #[test]
    fn test_double_flip_restores() {
        assert_eq!(apply_flip(apply_flip(tank(), true), true), tank());
    }
}
