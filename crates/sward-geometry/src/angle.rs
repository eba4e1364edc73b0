//! Heading math in radians.
//!
//! Headings produced by `atan2` live in `(-PI, PI]`, so two nearly equal
//! directions on either side of the `±PI` seam look almost `TAU` apart when
//! subtracted naively. The helpers here keep comparisons on one continuous
//! branch.

use core::f32::consts::{PI, TAU};
use libm::{atan2f, fmodf};

use crate::Point;

/// Heading of the vector `b - a`, in `(-PI, PI]`.
pub fn angle_between(a: Point, b: Point) -> f32 {
    atan2f(b.y - a.y, b.x - a.x)
}

/// Normalize an angle to be within `[-PI, PI)`.
///
/// Angles at `PI` are normalized to `-PI`.
pub fn normalize_angle(angle: f32) -> f32 {
    let a = fmodf(angle, TAU);
    if a >= PI {
        a - TAU
    } else if a < -PI {
        a + TAU
    } else {
        a
    }
}

/// Shifts `angle` by a multiple of `TAU` so that it lies within `PI` of
/// `reference`.
///
/// The geometric direction is unchanged; only the branch moves, so that
/// `angle - reference` no longer jumps by `TAU` at the seam. Non-finite input
/// yields NaN.
pub fn normalize_relative_to(angle: f32, reference: f32) -> f32 {
    let offset = angle - reference;
    if (-PI..=PI).contains(&offset) {
        return angle;
    }
    reference + wrap_half_turn(offset)
}

/// Signed shortest rotation from heading `a` to heading `b`, in `(-PI, PI]`.
///
/// Positive means `b` lies counter-clockwise of `a`. Non-finite input yields
/// NaN.
pub fn angular_distance(a: f32, b: f32) -> f32 {
    wrap_half_turn(b - a)
}

/// Wraps `d` into `(-PI, PI]`.
fn wrap_half_turn(d: f32) -> f32 {
    let d = fmodf(d, TAU);
    if d > PI {
        d - TAU
    } else if d <= -PI {
        d + TAU
    } else {
        d
    }
}
