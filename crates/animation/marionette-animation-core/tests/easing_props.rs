use marionette_animation_core::easing_sin;
use marionette_animation_core::fade::schedule_fade_out;
use proptest::prelude::*;

proptest! {
    /// it should be monotonically non-decreasing on [0, 1]
    #[test]
    fn easing_is_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(easing_sin(lo) <= easing_sin(hi) + 1e-6);
    }

    /// it should saturate outside [0, 1]
    #[test]
    fn easing_saturates(x in 1.0f32..1e6) {
        prop_assert_eq!(easing_sin(x), 1.0);
        prop_assert_eq!(easing_sin(-x), 0.0);
    }

    /// it should never push a scheduled fade-out deadline later
    #[test]
    fn fade_out_deadline_never_extends(
        requests in prop::collection::vec((0.0f32..10.0, 0.0f32..3.0), 1..12)
    ) {
        let mut end = -1.0f32;
        let mut now = 0.0f32;
        for (advance, fade_out) in requests {
            now += advance;
            let next = schedule_fade_out(end, now, fade_out);
            if end >= 0.0 {
                prop_assert!(next <= end);
            }
            prop_assert!(next <= now + fade_out);
            end = next;
        }
    }
}

#[test]
fn easing_endpoints() {
    assert_eq!(easing_sin(0.0), 0.0);
    assert_eq!(easing_sin(1.0), 1.0);
}
