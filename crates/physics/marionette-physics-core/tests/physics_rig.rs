use marionette_api_core::{ModelDesc, ParameterAccess, ParameterDesc, ParameterModel};
use marionette_physics_core::{
    build_chain, normalize_parameter_value, update_particles, Normalization, NormalizationRange,
    Physics, PhysicsChannel, PhysicsInputData, PhysicsOptions, PhysicsOutputData,
    PhysicsParticleData, PhysicsRigData, PhysicsSettingData, RigError, Vec2,
};
use proptest::prelude::*;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn model() -> ParameterModel {
    let mut m = ParameterModel::new();
    m.add_parameter(ParameterDesc::new("ParamAngleX", -30.0, 30.0, 0.0))
        .unwrap();
    m.add_parameter(ParameterDesc::new("ParamHairFront", -1.0, 1.0, 0.0))
        .unwrap();
    m.add_parameter(ParameterDesc::new("ParamHairSide", -1.0, 1.0, 0.0))
        .unwrap();
    m
}

fn particle(radius: f32) -> PhysicsParticleData {
    PhysicsParticleData {
        mobility: 0.95,
        delay: 0.9,
        acceleration: 1.5,
        radius,
    }
}

fn rig(kind: PhysicsChannel, output: PhysicsChannel, fps: f32) -> PhysicsRigData {
    PhysicsRigData {
        options: PhysicsOptions::default(),
        fps,
        settings: vec![PhysicsSettingData {
            name: Some("front".into()),
            normalization: Normalization::default(),
            inputs: vec![PhysicsInputData {
                source: "ParamAngleX".into(),
                weight: 100.0,
                kind,
                reflect: false,
            }],
            outputs: vec![PhysicsOutputData {
                destination: "ParamHairFront".into(),
                particle_index: 1,
                scale: 1.0,
                weight: 100.0,
                kind: output,
                reflect: false,
            }],
            particles: vec![particle(0.0), particle(3.0)],
        }],
    }
}

fn hair(m: &ParameterModel) -> f32 {
    m.value_by_id("ParamHairFront").unwrap()
}

/// it should hold its pose after stabilizing at constant inputs
#[test]
fn stabilized_rig_is_a_fixed_point() {
    let mut m = model();
    m.set_value_by_id("ParamAngleX", 30.0, 1.0);
    let mut physics = Physics::new(&rig(PhysicsChannel::Angle, PhysicsChannel::Angle, 30.0), &m)
        .unwrap();
    physics.stabilize(&mut m);

    // input angle normalizes to 10 degrees; the rod tilts the same way
    let settled = hair(&m);
    approx(settled, -10f32.to_radians(), 1e-4);
    let before: Vec<Vec2> = physics.particles(0).unwrap().iter().map(|p| p.position).collect();

    for _ in 0..60 {
        physics.evaluate(1.0 / 60.0, &mut m);
        approx(hair(&m), settled, 1e-4);
    }
    for (p, b) in physics.particles(0).unwrap().iter().zip(before) {
        assert!((p.position - b).length() < 1e-4);
    }
}

/// it should stay put with no inputs, gravity change or wind
#[test]
fn idle_rig_stays_at_rest() {
    let mut m = model();
    let mut physics =
        Physics::new(&rig(PhysicsChannel::X, PhysicsChannel::X, 30.0), &m).unwrap();
    physics.stabilize(&mut m);
    for _ in 0..90 {
        physics.evaluate(1.0 / 30.0, &mut m);
    }
    let chain = physics.particles(0).unwrap();
    assert_eq!(chain[0].position, Vec2::ZERO);
    approx(chain[1].position.x, 0.0, 1e-6);
    approx(chain[1].position.y, 3.0, 1e-5);
    approx(hair(&m), 0.0, 1e-6);
}

/// it should swing the hair after a head turn, lagging by one step
#[test]
fn head_turn_swings_hair() {
    let mut m = model();
    let mut physics =
        Physics::new(&rig(PhysicsChannel::Angle, PhysicsChannel::Angle, 30.0), &m).unwrap();
    physics.stabilize(&mut m);
    m.set_value_by_id("ParamAngleX", 30.0, 1.0);

    physics.evaluate(1.0 / 30.0, &mut m);
    // interpolation lands on the previous step's output
    approx(hair(&m), 0.0, 1e-6);

    for _ in 0..10 {
        physics.evaluate(1.0 / 30.0, &mut m);
    }
    assert!(hair(&m) < -0.01, "hair={}", hair(&m));
    assert!(hair(&m) >= -1.0);
}

/// it should clamp outputs and record how far they overshot
#[test]
fn overshoot_is_clamped_and_reported() {
    let mut m = model();
    let mut data = rig(PhysicsChannel::X, PhysicsChannel::X, 30.0);
    data.options.wind = Vec2::new(1.5, 0.0);
    let mut physics = Physics::new(&data, &m).unwrap();
    physics.stabilize(&mut m);

    // force (1.5, 1.5) puts the rod at 45 degrees: x = 3 / sqrt(2)
    approx(hair(&m), 1.0, 0.0);
    let report = physics.overshoot();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].destination, "ParamHairFront");
    approx(
        report[0].exceeded_maximum.unwrap(),
        3.0 / 2f32.sqrt(),
        1e-4,
    );
    assert_eq!(report[0].below_minimum, None);

    physics.reset_overshoot();
    assert!(physics.overshoot().is_empty());
}

/// it should step at the rig rate and keep the remainder
#[test]
fn fixed_step_keeps_remainder() {
    let mut m = model();
    let mut physics =
        Physics::new(&rig(PhysicsChannel::X, PhysicsChannel::X, 32.0), &m).unwrap();
    physics.evaluate(0.0625, &mut m);
    approx(physics.remaining_time(), 0.0, 1e-7);
    physics.evaluate(0.046875, &mut m);
    approx(physics.remaining_time(), 0.015625, 1e-7);
}

/// it should drop a backlog longer than five seconds
#[test]
fn long_stall_drops_backlog() {
    let mut m = model();
    let mut physics =
        Physics::new(&rig(PhysicsChannel::X, PhysicsChannel::X, 30.0), &m).unwrap();
    physics.evaluate(6.0, &mut m);
    assert_eq!(physics.remaining_time(), 0.0);
    physics.evaluate(-1.0, &mut m);
    physics.evaluate(f32::NAN, &mut m);
    assert_eq!(physics.remaining_time(), 0.0);
}

/// it should step once per tick when the rig has no fixed rate
#[test]
fn zero_fps_steps_per_tick() {
    let mut m = model();
    let mut physics =
        Physics::new(&rig(PhysicsChannel::X, PhysicsChannel::X, 0.0), &m).unwrap();
    physics.evaluate(1.0 / 60.0, &mut m);
    assert_eq!(physics.remaining_time(), 0.0);
}

/// it should re-publish the last outputs on a zero-length tick
#[test]
fn zero_dt_rewrites_outputs() {
    for fps in [30.0, 0.0] {
        let mut m = model();
        let mut physics =
            Physics::new(&rig(PhysicsChannel::Angle, PhysicsChannel::Angle, fps), &m).unwrap();
        physics.stabilize(&mut m);
        m.set_value_by_id("ParamAngleX", 30.0, 1.0);
        for _ in 0..11 {
            physics.evaluate(1.0 / 30.0, &mut m);
        }
        let swung = hair(&m);
        assert!(swung < -0.01, "fps={fps} hair={swung}");
        let remaining = physics.remaining_time();

        // a snapshot restore wipes the output before physics runs again
        m.set_value_by_id("ParamHairFront", 0.0, 1.0);
        physics.evaluate(0.0, &mut m);
        approx(hair(&m), swung, 1e-6);
        assert_eq!(physics.remaining_time(), remaining);
    }
}

/// it should reject structurally broken rigs
#[test]
fn rejects_broken_rigs() {
    let m = model();
    let mut data = rig(PhysicsChannel::X, PhysicsChannel::X, -1.0);
    assert_eq!(Physics::new(&data, &m).unwrap_err(), RigError::InvalidFps(-1.0));

    data.fps = 30.0;
    data.settings[0].particles.clear();
    assert_eq!(
        Physics::new(&data, &m).unwrap_err(),
        RigError::EmptyChain { rig: 0 }
    );

    data.settings[0].particles = vec![particle(0.0), particle(f32::NAN)];
    assert!(matches!(
        Physics::new(&data, &m).unwrap_err(),
        RigError::InvalidParticle { rig: 0, particle: 1, field: "radius" }
    ));
}

/// it should skip entries that reference missing parameters or particles
#[test]
fn skips_unbindable_entries() {
    let mut m = model();
    let mut data = rig(PhysicsChannel::X, PhysicsChannel::X, 30.0);
    data.settings[0].inputs[0].source = "ParamNope".into();
    data.settings[0].outputs.push(PhysicsOutputData {
        destination: "ParamHairSide".into(),
        particle_index: 5,
        scale: 1.0,
        weight: 100.0,
        kind: PhysicsChannel::X,
        reflect: false,
    });
    let mut physics = Physics::new(&data, &m).unwrap();
    physics.stabilize(&mut m);
    physics.evaluate(0.1, &mut m);
    assert_eq!(m.value_by_id("ParamHairSide"), Some(0.0));
}

/// it should drive both hair rigs of the shared fixture within range
#[test]
fn hair_fixture_stays_in_range() {
    let desc: ModelDesc = marionette_test_fixtures::models::load("sample").unwrap();
    let mut m = ParameterModel::from_desc(&desc).unwrap();
    let data: PhysicsRigData = marionette_test_fixtures::physics::load("hair").unwrap();
    let mut physics = Physics::new(&data, &m).unwrap();
    assert_eq!(physics.rig_count(), 2);
    physics.stabilize(&mut m);

    let mut moved = false;
    for i in 0..120 {
        let t = i as f32 / 60.0;
        m.set_value_by_id("ParamAngleX", 30.0 * (t * 3.0).sin(), 1.0);
        physics.evaluate(1.0 / 60.0, &mut m);
        for id in ["ParamHairFront", "ParamHairBack"] {
            let v = m.value_by_id(id).unwrap();
            assert!((-1.0..=1.0).contains(&v));
            moved |= v.abs() > 1e-3;
        }
    }
    assert!(moved);
}

proptest! {
    /// it should keep every rod at its radius whatever the inputs
    #[test]
    fn rods_never_stretch(
        radii in proptest::collection::vec(0.1f32..5.0, 1..6),
        steps in proptest::collection::vec(
            (-10.0f32..10.0, -10.0f32..10.0, -30.0f32..30.0, -2.0f32..2.0, -2.0f32..2.0),
            1..30,
        ),
    ) {
        let data: Vec<PhysicsParticleData> = std::iter::once(particle(0.0))
            .chain(radii.iter().map(|&r| particle(r)))
            .collect();
        let mut chain = build_chain(&data);
        for (tx, ty, angle, wx, wy) in steps {
            update_particles(
                &mut chain,
                Vec2::new(tx, ty),
                angle,
                Vec2::new(wx, wy),
                0.0,
                1.0 / 30.0,
            );
            prop_assert_eq!(chain[0].position, Vec2::new(tx, ty));
            for i in 1..chain.len() {
                let d = (chain[i].position - chain[i - 1].position).length();
                prop_assert!((d - chain[i].radius).abs() <= 1e-3 * chain[i].radius.max(1.0));
            }
        }
    }

    /// it should map default, max and min exactly and flip sign under reflect
    #[test]
    fn normalization_anchors(
        min in -100.0f32..-1.0,
        max in 1.0f32..100.0,
        frac in 0.0f32..1.0,
        value in -200.0f32..200.0,
    ) {
        let default = min + (max - min) * frac;
        let range = marionette_api_core::ParameterRange { min, max, default };
        let norm = NormalizationRange { minimum: -10.0, maximum: 10.0, default: 0.0 };
        prop_assert_eq!(normalize_parameter_value(default, &range, &norm, false), norm.default);
        if max > default {
            prop_assert_eq!(normalize_parameter_value(max, &range, &norm, false), norm.maximum);
        }
        if min < default {
            prop_assert_eq!(normalize_parameter_value(min, &range, &norm, false), norm.minimum);
        }
        let plain = normalize_parameter_value(value, &range, &norm, false);
        let reflected = normalize_parameter_value(value, &range, &norm, true);
        prop_assert_eq!(reflected, -plain);
        prop_assert!((norm.minimum..=norm.maximum).contains(&plain));
    }
}
