//! A cheap, order-preserving stand-in for `atan2`.
//!
//! The partitioner only ever *compares* angles between face normals, so it
//! does not need the real arctangent. [`not_atan2`] maps every ratio `y / x`
//! monotonically onto `[-PI, PI]` with the same quadrant layout as `atan2`:
//!
//! | quadrant         | result          |
//! |------------------|-----------------|
//! | `x > 0`, `y > 0` | `(0, PI/2)`     |
//! | `x > 0`, `y < 0` | `(-PI/2, 0)`    |
//! | `x < 0`, `y > 0` | `(PI/2, PI)`    |
//! | `x < 0`, `y < 0` | `(-PI, -PI/2)`  |
//!
//! `not_atan2(y1, x1) < not_atan2(y2, x2)` agrees with the same comparison on
//! `atan2` unless the true angles are a few ULP apart (then the results may tie)
//! or one of the inputs is degenerate: both operands zero, both infinite, or any
//! NaN. Degenerate inputs return exactly `0.0`.

use std::f64::consts::PI;

/// Monotonic `atan2` substitute. Never fails and never returns NaN.
#[must_use]
#[inline]
pub fn not_atan2(y: f64, x: f64) -> f64 {
    let alpha = y / x;
    if alpha.is_nan() {
        // 0/0, inf/inf and NaN operands.
        return 0.0;
    }

    // PI/2 * alpha / (|alpha| + 1), rearranged so alpha only appears in the
    // divisor and alpha = inf saturates to PI/2 instead of producing NaN.
    let normalized = PI * 0.5 * alpha.signum() * (1.0 - 1.0 / (1.0 + alpha.abs()));
    if x.is_sign_positive() {
        normalized
    } else if y.is_sign_positive() {
        normalized + PI
    } else {
        // y = -0.0 lands here, matching atan2(-0.0, -1.0) = -PI.
        normalized - PI
    }
}

/// Single-precision variant of [`not_atan2`], same algorithm.
#[must_use]
#[inline]
pub fn not_atan2_f32(y: f32, x: f32) -> f32 {
    use std::f32::consts::PI;

    let alpha = y / x;
    if alpha.is_nan() {
        return 0.0;
    }
    let normalized = PI * 0.5 * alpha.signum() * (1.0 - 1.0 / (1.0 + alpha.abs()));
    if x.is_sign_positive() {
        normalized
    } else if y.is_sign_positive() {
        normalized + PI
    } else {
        normalized - PI
    }
}
