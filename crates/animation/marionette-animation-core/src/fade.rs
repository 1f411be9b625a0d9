//! Fade weights shared by motions and expressions.
//!
//! A zero (or negative) fade time means the transition is instantaneous and
//! the weight is 1. A negative end time means no fade-out is scheduled.

use crate::interp::functions::easing_sin;

#[inline]
pub fn fade_in_weight(now: f32, start: f32, fade_in: f32) -> f32 {
    if fade_in <= 0.0 {
        1.0
    } else {
        easing_sin((now - start) / fade_in)
    }
}

#[inline]
pub fn fade_out_weight(now: f32, end: f32, fade_out: f32) -> f32 {
    if end < 0.0 || fade_out <= 0.0 {
        1.0
    } else {
        easing_sin((end - now) / fade_out)
    }
}

/// Earliest-deadline-wins scheduling of a fade-out starting at `now`.
#[inline]
pub fn schedule_fade_out(end: f32, now: f32, fade_out: f32) -> f32 {
    let deadline = now + fade_out.max(0.0);
    if end < 0.0 || deadline < end {
        deadline
    } else {
        end
    }
}

/// Sanitize a host-supplied delta time.
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fade_is_instant() {
        assert_eq!(fade_in_weight(0.0, 0.0, 0.0), 1.0);
        assert_eq!(fade_out_weight(5.0, 5.0, 0.0), 1.0);
        assert_eq!(fade_out_weight(5.0, -1.0, 0.3), 1.0);
    }

    #[test]
    fn earliest_deadline_wins() {
        let end = schedule_fade_out(-1.0, 1.0, 0.5);
        assert_eq!(end, 1.5);
        assert_eq!(schedule_fade_out(end, 1.25, 1.0), 1.5);
        assert_eq!(schedule_fade_out(end, 1.0, 0.25), 1.25);
    }
}
