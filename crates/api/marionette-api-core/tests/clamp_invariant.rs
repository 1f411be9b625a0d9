use marionette_api_core::{
    blend::apply, BlendMode, ParameterAccess, ParameterDesc, ParameterModel,
};
use proptest::prelude::*;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn mode() -> impl Strategy<Value = BlendMode> {
    prop_oneof![
        Just(BlendMode::Overwrite),
        Just(BlendMode::Additive),
        Just(BlendMode::Multiplicative),
    ]
}

proptest! {
    /// it should keep every parameter inside [min, max] after any blended write
    #[test]
    fn writes_never_leave_range(
        min in -100.0f32..0.0,
        span in 0.01f32..200.0,
        start in -1000.0f32..1000.0,
        writes in prop::collection::vec((mode(), -1000.0f32..1000.0, 0.0f32..=1.0), 1..16),
    ) {
        let max = min + span;
        let mut model = ParameterModel::new();
        let mut desc = ParameterDesc::new("p", min, max, min);
        desc.value = Some(start);
        let idx = model.add_parameter(desc).unwrap();
        for (mode, target, weight) in writes {
            let v = model.write(idx, target, mode, weight).unwrap();
            prop_assert!(v >= min && v <= max, "value {} escaped [{}, {}]", v, min, max);
        }
    }

    /// it should treat a zero weight as a no-op for every blend mode
    #[test]
    fn zero_weight_is_identity(mode in mode(), current in -10.0f32..10.0, target in -10.0f32..10.0) {
        prop_assert_eq!(apply(mode, current, target, 0.0), current);
    }
}

/// it should expose a normalized view of the value
#[test]
fn normalized_value_tracks_range() {
    let mut model = ParameterModel::new();
    let idx = model
        .add_parameter(ParameterDesc::new("ParamBodyAngleX", -10.0, 10.0, 0.0))
        .unwrap();
    approx(model.normalized_value(idx).unwrap(), 0.5, 1e-6);
    model.set_value(idx, 5.0, 1.0);
    approx(model.normalized_value(idx).unwrap(), 0.75, 1e-6);
    approx(model.value_by_id("ParamBodyAngleX").unwrap(), 5.0, 1e-6);
}
