//! Angle math and circle collision primitives

use std::f32::consts::{PI, TAU};

/// Centers closer than this are treated as coincident and skipped, so the
/// collision normal never divides by zero.
const DEGENERATE_DISTANCE: f32 = 1e-4;

/// Normalize an angle into (-PI, PI].
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Shortest signed rotation from `from` to `to`, in (-PI, PI].
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Squared distance between two points.
pub fn dist_sq(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    dx * dx + dy * dy
}

/// Collision normal from circle 1 toward circle 2 plus penetration depth.
///
/// Returns `None` when the circles do not overlap, or when the centers are
/// coincident (degenerate case, skipped by the caller).
pub fn collision_normal(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    r1: f32,
    r2: f32,
) -> Option<(f32, f32, f32)> {
    let combined = r1 + r2;
    let d2 = dist_sq(x1, y1, x2, y2);
    if d2 > combined * combined {
        return None;
    }

    let dist = d2.sqrt();
    if dist < DEGENERATE_DISTANCE {
        return None;
    }

    let nx = (x2 - x1) / dist;
    let ny = (y2 - y1) / dist;
    Some((nx, ny, combined - dist))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn normalize_wraps_into_half_open_range() {
        assert_approx_eq!(normalize_angle(0.0), 0.0);
        assert_approx_eq!(normalize_angle(PI), PI);
        assert_approx_eq!(normalize_angle(-PI), PI);
        assert_approx_eq!(normalize_angle(3.0 * PI / 2.0), -PI / 2.0, 1e-5);
        assert_approx_eq!(normalize_angle(5.0 * TAU + 0.25), 0.25, 1e-4);
    }

    #[test]
    fn delta_takes_the_shorter_path_across_the_seam() {
        // 170 degrees to -170 degrees is 20 degrees through the seam, not 340
        let from = PI * 170.0 / 180.0;
        let to = -PI * 170.0 / 180.0;
        let delta = angle_delta(from, to);
        assert_approx_eq!(delta, PI * 20.0 / 180.0, 1e-5);
    }

    #[test]
    fn normal_appears_exactly_at_combined_radii() {
        assert!(collision_normal(0.0, 0.0, 15.0, 0.0, 10.0, 5.0).is_some());
        assert!(collision_normal(0.0, 0.0, 15.1, 0.0, 10.0, 5.0).is_none());
    }

    #[test]
    fn normal_points_from_first_toward_second() {
        let (nx, ny, depth) = collision_normal(0.0, 0.0, 30.0, 0.0, 25.0, 25.0).unwrap();
        assert_approx_eq!(nx, 1.0);
        assert_approx_eq!(ny, 0.0);
        assert_approx_eq!(depth, 20.0);
    }

    #[test]
    fn separated_and_coincident_circles_yield_no_normal() {
        assert!(collision_normal(0.0, 0.0, 100.0, 0.0, 25.0, 25.0).is_none());
        assert!(collision_normal(500.0, 500.0, 500.0, 500.0, 25.0, 25.0).is_none());
    }
}
