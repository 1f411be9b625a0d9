//! Interpolation helpers:
//! - easing_sin (raised-cosine fade curve)
//! - lerp_f32
//! - cubic bezier evaluation with the time axis inverted by binary search

use std::f32::consts::PI;

/// Raised-cosine ease used by every fade in the crate.
///
/// 0 below 0, 1 at or above 1, `0.5 - 0.5*cos(pi*x)` in between.
#[inline]
pub fn easing_sin(x: f32) -> f32 {
    if x.is_nan() || x < 0.0 {
        0.0
    } else if x >= 1.0 {
        1.0
    } else {
        0.5 - 0.5 * (PI * x).cos()
    }
}

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Evaluate a cubic bezier whose x axis is time.
///
/// `x` holds the four time coordinates, `y` the four values. Control times are
/// clamped into the segment so x stays monotonic, then the curve parameter
/// for `time` is found by binary search.
pub fn bezier_at_time(x: [f32; 4], y: [f32; 4], time: f32) -> f32 {
    let (x0, x3) = (x[0], x[3]);
    if x3 <= x0 {
        return y[3];
    }
    let x1 = x[1].clamp(x0, x3);
    let x2 = x[2].clamp(x0, x3);
    let time = time.clamp(x0, x3);
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = (time - x0) / (x3 - x0);
    for _ in 0..24 {
        let xm = cubic_bezier(x0, x1, x2, x3, mid);
        if (xm - time).abs() < 1e-6 {
            break;
        }
        if xm < time {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(y[0], y[1], y[2], y[3], mid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_saturates() {
        assert_eq!(easing_sin(-0.5), 0.0);
        assert_eq!(easing_sin(0.0), 0.0);
        assert_eq!(easing_sin(1.0), 1.0);
        assert_eq!(easing_sin(3.0), 1.0);
        assert!((easing_sin(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn straight_bezier_is_linear() {
        let x = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0];
        let y = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0];
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((bezier_at_time(x, y, t) - t).abs() < 1e-4);
        }
    }
}
