//! Kinematic primitives and geometric predicates
//!
//! Pure functions over positions and velocities. The thresholds are
//! scenario-invariant: every analyzer classifies motion with the same
//! constants so role binding stays comparable across topologies.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use crate::scene::Vec3;

/// Below this speed an object is stationary
pub const STATIONARY_SPEED: f64 = 0.01;

/// Closing speed required for `moving_towards`, also the onset speed
pub const APPROACH_SPEED: f64 = 0.1;

/// Direction cosine below which a velocity change counts as a deviation
pub const DEVIATION_COSINE: f64 = 0.5;

/// Speed ratio above which an object is considered struck
pub const SPEED_JUMP_RATIO: f64 = 1.5;

/// Euclidean distance between two points
pub fn distance(p: &Vec3, q: &Vec3) -> f64 {
    p.iter()
        .zip(q.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Magnitude of a velocity vector
pub fn speed(v: &Vec3) -> f64 {
    v.iter().map(|c| c * c).sum::<f64>().sqrt()
}

pub fn is_stationary(v: &Vec3) -> bool {
    speed(v) < STATIONARY_SPEED
}

/// True iff A's velocity has a closing component toward B above
/// `APPROACH_SPEED`. Coincident points have no direction and never qualify.
pub fn moving_towards(pos_a: &Vec3, vel_a: &Vec3, pos_b: &Vec3, _vel_b: &Vec3) -> bool {
    let direction = sub(pos_b, pos_a);
    let magnitude = speed(&direction);
    if magnitude == 0.0 {
        return false;
    }
    let unit = direction.map(|d| d / magnitude);
    dot(vel_a, &unit) > APPROACH_SPEED
}

/// Cosine between two velocities, defined only when both exceed the
/// approach speed
pub fn direction_cosine(current: &Vec3, previous: &Vec3) -> Option<f64> {
    let current_speed = speed(current);
    let previous_speed = speed(previous);
    if current_speed > APPROACH_SPEED && previous_speed > APPROACH_SPEED {
        Some(dot(current, previous) / (current_speed * previous_speed))
    } else {
        None
    }
}

/// Angle in radians corresponding to a direction cosine
pub fn angle_from_cosine(cosine: f64) -> f64 {
    cosine.clamp(-1.0, 1.0).acos()
}

/// 3-D collinearity with a tolerance relative to the spanning vectors
pub fn are_collinear(p1: &Vec3, p2: &Vec3, p3: &Vec3, eps: f64) -> bool {
    let v1 = sub(p2, p1);
    let v2 = sub(p3, p1);
    let cross = speed(&cross(&v1, &v2));
    cross <= eps * (speed(&v1) + speed(&v2) + 1e-6)
}

/// `mid` lies on the segment between `left` and `right` (distance-sum test)
pub fn is_between(left: &Vec3, mid: &Vec3, right: &Vec3, rel_eps: f64) -> bool {
    let d_lr = distance(left, right);
    let d_lm = distance(left, mid);
    let d_mr = distance(mid, right);
    ((d_lm + d_mr) - d_lr).abs() <= rel_eps * d_lr.max(1.0)
}

/// Magnitude of the planar (x, y) cross product of `a` and `b`
pub fn planar_cross(a: &Vec3, b: &Vec3) -> f64 {
    (a[0] * b[1] - a[1] * b[0]).abs()
}

pub(crate) fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_and_speed() {
        assert_eq!(distance(&[0.0, 0.0, 0.0], &[3.0, 4.0, 0.0]), 5.0);
        assert_eq!(speed(&[0.0, -3.0, 4.0]), 5.0);
    }

    #[test]
    fn test_stationary_boundary() {
        assert!(is_stationary(&[0.0, 0.0, 0.0]));
        assert!(is_stationary(&[0.0099, 0.0, 0.0]));
        // Exactly at the threshold the object is already moving
        assert!(!is_stationary(&[0.01, 0.0, 0.0]));
        assert!(!is_stationary(&[0.0, 0.02, 0.0]));
    }

    #[test]
    fn test_moving_towards_requires_closing_speed() {
        let a = [0.0, 0.0, 0.0];
        let b = [4.0, 0.0, 0.0];
        let still = [0.0; 3];

        assert!(moving_towards(&a, &[0.5, 0.0, 0.0], &b, &still));
        assert!(!moving_towards(&a, &[-0.5, 0.0, 0.0], &b, &still));
        // Perpendicular motion has no closing component
        assert!(!moving_towards(&a, &[0.0, 1.0, 0.0], &b, &still));
        // Closing component at the threshold does not count
        assert!(!moving_towards(&a, &[0.1, 0.0, 0.0], &b, &still));
    }

    #[test]
    fn test_moving_towards_coincident_points() {
        let p = [1.0, 1.0, 0.0];
        assert!(!moving_towards(&p, &[1.0, 0.0, 0.0], &p, &[0.0; 3]));
    }

    #[test]
    fn test_direction_cosine() {
        let cosine = direction_cosine(&[0.0, 1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap();
        assert!(cosine.abs() < 1e-12);
        assert!((angle_from_cosine(cosine) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        // Too slow to have a meaningful direction
        assert!(direction_cosine(&[0.05, 0.0, 0.0], &[1.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn test_collinearity_and_betweenness() {
        let left = [-4.0, 0.0, 0.0];
        let mid = [0.0, 0.0, 0.0];
        let right = [2.0, 0.0, 0.0];

        assert!(are_collinear(&left, &mid, &right, 1e-2));
        assert!(is_between(&left, &mid, &right, 1e-2));
        assert!(!is_between(&left, &right, &mid, 1e-2));

        let off_line = [0.0, 1.0, 0.0];
        assert!(!are_collinear(&left, &off_line, &right, 1e-2));
        assert!(!is_between(&left, &off_line, &right, 1e-2));
    }

    #[test]
    fn test_planar_cross_ignores_height() {
        assert_eq!(planar_cross(&[5.0, 0.0, 9.0], &[2.0, 0.0, -3.0]), 0.0);
        assert_eq!(planar_cross(&[1.0, 0.0, 0.0], &[0.0, 2.0, 0.0]), 2.0);
    }
}
