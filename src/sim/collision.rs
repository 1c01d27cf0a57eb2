//! Axis-aligned box collision tests
//!
//! Every spatial entity is a `Body` (top-left corner plus size). Edges that
//! merely touch do not overlap.

use super::state::Body;
use crate::consts::{PLAY_AREA_MAX_X, PLAY_AREA_MIN_X};

/// Strict AABB overlap
#[inline]
pub fn overlaps(a: &Body, b: &Body) -> bool {
    a.pos.x < b.right() && a.right() > b.pos.x && a.pos.y < b.bottom() && a.bottom() > b.pos.y
}

/// Overlap against `target` grown by `pad` on every side
#[inline]
pub fn overlaps_padded(a: &Body, target: &Body, pad: f32) -> bool {
    a.pos.x < target.right() + pad
        && a.right() > target.pos.x - pad
        && a.pos.y < target.bottom() + pad
        && a.bottom() > target.pos.y - pad
}

/// Would `body` moved to `x` overlap any of `blockers`?
pub fn blocked_at<'a>(body: &Body, x: f32, blockers: impl IntoIterator<Item = &'a Body>) -> bool {
    let mut moved = *body;
    moved.pos.x = x;
    blockers.into_iter().any(|b| overlaps(&moved, b))
}

/// Clamp a box's x into the road
#[inline]
pub fn clamp_to_band(x: f32, width: f32) -> f32 {
    x.clamp(PLAY_AREA_MIN_X, PLAY_AREA_MAX_X - width)
}

/// Keep a moving box on the road, reflecting its horizontal velocity off the
/// band edges. Returns true when a wall was hit.
pub fn bounce_in_band(body: &mut Body) -> bool {
    if body.pos.x < PLAY_AREA_MIN_X {
        body.pos.x = PLAY_AREA_MIN_X;
        body.vel.x = body.vel.x.abs();
        true
    } else if body.pos.x > PLAY_AREA_MAX_X - body.size.x {
        body.pos.x = PLAY_AREA_MAX_X - body.size.x;
        body.vel.x = -body.vel.x.abs();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Body::new(0.0, 0.0, 10.0, 10.0);
        assert!(overlaps(&a, &Body::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!overlaps(&a, &Body::new(20.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Body::new(0.0, 0.0, 10.0, 10.0);
        assert!(!overlaps(&a, &Body::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!overlaps(&a, &Body::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_padded_overlap() {
        let player = Body::new(100.0, 100.0, 36.0, 36.0);
        let near = Body::new(140.0, 100.0, 16.0, 16.0);
        assert!(!overlaps(&near, &player));
        assert!(overlaps_padded(&near, &player, 10.0));
        assert!(!overlaps_padded(&Body::new(147.0, 100.0, 16.0, 16.0), &player, 10.0));
    }

    #[test]
    fn test_blocked_at() {
        let player = Body::new(150.0, 500.0, 36.0, 36.0);
        let can = Body::new(190.0, 510.0, 30.0, 30.0);
        assert!(!blocked_at(&player, 150.0, [&can]));
        assert!(blocked_at(&player, 160.0, [&can]));
    }

    #[test]
    fn test_bounce_in_band() {
        let mut body = Body::new(PLAY_AREA_MIN_X - 3.0, 0.0, 32.0, 32.0).with_vel(-1.0, 1.0);
        assert!(bounce_in_band(&mut body));
        assert_eq!(body.pos.x, PLAY_AREA_MIN_X);
        assert_eq!(body.vel.x, 1.0);

        let mut body = Body::new(PLAY_AREA_MAX_X, 0.0, 32.0, 32.0).with_vel(0.5, 1.0);
        assert!(bounce_in_band(&mut body));
        assert_eq!(body.pos.x, PLAY_AREA_MAX_X - 32.0);
        assert_eq!(body.vel.x, -0.5);

        let mut body = Body::new(200.0, 0.0, 32.0, 32.0).with_vel(0.5, 1.0);
        assert!(!bounce_in_band(&mut body));
        assert_eq!(body.vel.x, 0.5);
    }
}
