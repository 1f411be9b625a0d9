use criterion::{black_box, criterion_group, criterion_main, Criterion};

use marionette_animation_core::{
    Config, Curve, CurvePoint, MotionCurve, MotionData, MotionPriority, MotionQueue, Outputs,
    Segment,
};
use marionette_api_core::{ParameterDesc, ParameterModel};

const PARAMS: usize = 64;

fn model() -> ParameterModel {
    let mut m = ParameterModel::new();
    for i in 0..PARAMS {
        m.add_parameter(ParameterDesc::new(format!("Param{i}"), -30.0, 30.0, 0.0))
            .expect("bench parameter");
    }
    m
}

fn motion(seed: f32) -> MotionData {
    let mut data = MotionData::new(4.0);
    data.looping = true;
    for i in 0..PARAMS {
        let phase = seed + i as f32 * 0.1;
        data.curves.push(MotionCurve::parameter(
            format!("Param{i}"),
            Curve {
                start: CurvePoint::new(0.0, 0.0),
                segments: vec![
                    Segment::Bezier {
                        c0: CurvePoint::new(0.5, 10.0 * phase.sin()),
                        c1: CurvePoint::new(1.5, -10.0),
                        end: CurvePoint::new(2.0, 0.0),
                    },
                    Segment::Linear {
                        end: CurvePoint::new(4.0, 20.0),
                    },
                ],
            },
        ));
    }
    data
}

fn bench_motion_queue(c: &mut Criterion) {
    let mut m = model();
    let mut q = MotionQueue::new(Config::default(), vec![motion(0.0), motion(1.0)])
        .expect("bench motions");
    q.play(0, 0.0, MotionPriority::Idle).expect("play");
    q.play(1, 0.0, MotionPriority::Force).expect("play");
    let mut out = Outputs::default();

    c.bench_function("motion_queue_crossfade_64_params", |b| {
        b.iter(|| {
            out.clear();
            q.update(black_box(1.0 / 60.0), &mut m, &mut out);
        })
    });
}

criterion_group!(benches, bench_motion_queue);
criterion_main!(benches);
