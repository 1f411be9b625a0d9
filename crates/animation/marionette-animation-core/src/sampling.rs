//! Curve sampling.
//!
//! Times before the first key return the first value and times past the last
//! key hold the last value. Segment lookup is a linear scan; curves are short.

use crate::data::{Curve, CurvePoint, Segment};
use crate::interp::functions::{bezier_at_time, lerp_f32};

/// Sample `curve` at absolute curve time `time` (seconds).
pub fn sample_curve(curve: &Curve, time: f32) -> f32 {
    let mut start = curve.start;
    if time <= start.time {
        return start.value;
    }
    for segment in &curve.segments {
        let end = segment.end();
        if time <= end.time {
            return sample_segment(segment, start, time);
        }
        start = end;
    }
    start.value
}

fn sample_segment(segment: &Segment, start: CurvePoint, time: f32) -> f32 {
    match *segment {
        Segment::Linear { end } => {
            let span = end.time - start.time;
            if span <= 0.0 {
                return end.value;
            }
            let t = ((time - start.time) / span).clamp(0.0, 1.0);
            lerp_f32(start.value, end.value, t)
        }
        Segment::Bezier { c0, c1, end } => bezier_at_time(
            [start.time, c0.time, c1.time, end.time],
            [start.value, c0.value, c1.value, end.value],
            time,
        ),
        Segment::Stepped { end } => {
            if time >= end.time {
                end.value
            } else {
                start.value
            }
        }
        Segment::InverseStepped { end } => {
            if time > start.time {
                end.value
            } else {
                start.value
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "left={a} right={b}");
    }

    #[test]
    fn linear_holds_ends() {
        let c = Curve::linear(&[(0.5, 1.0), (1.5, 3.0)]);
        approx(sample_curve(&c, 0.0), 1.0);
        approx(sample_curve(&c, 1.0), 2.0);
        approx(sample_curve(&c, 9.0), 3.0);
    }

    #[test]
    fn stepped_and_inverse_stepped() {
        let p = |t, v| CurvePoint::new(t, v);
        let stepped = Curve {
            start: p(0.0, 0.0),
            segments: vec![Segment::Stepped { end: p(1.0, 1.0) }],
        };
        approx(sample_curve(&stepped, 0.99), 0.0);
        approx(sample_curve(&stepped, 1.0), 1.0);

        let inverse = Curve {
            start: p(0.0, 0.0),
            segments: vec![Segment::InverseStepped { end: p(1.0, 1.0) }],
        };
        approx(sample_curve(&inverse, 0.0), 0.0);
        approx(sample_curve(&inverse, 0.01), 1.0);
    }

    #[test]
    fn bezier_passes_through_keys() {
        let p = |t, v| CurvePoint::new(t, v);
        let c = Curve {
            start: p(0.0, 0.0),
            segments: vec![Segment::Bezier {
                c0: p(0.3, 0.0),
                c1: p(0.7, 10.0),
                end: p(1.0, 10.0),
            }],
        };
        approx(sample_curve(&c, 0.0), 0.0);
        approx(sample_curve(&c, 1.0), 10.0);
        let mid = sample_curve(&c, 0.5);
        assert!((4.0..6.0).contains(&mid), "mid={mid}");
    }
}
