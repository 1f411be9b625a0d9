use marionette_api_core::{ModelDesc, ParameterAccess, ParameterDesc, ParameterModel, PartDesc};
use marionette_effects_core::{hidden_opacity_ceiling, Pose, PoseData, PoseError, PosePartData};
use proptest::prelude::*;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn model(a_opacity: f32, b_opacity: f32) -> ParameterModel {
    let mut m = ParameterModel::new();
    m.add_parameter(ParameterDesc::new("A", 0.0, 1.0, 1.0)).unwrap();
    m.add_parameter(ParameterDesc::new("B", 0.0, 1.0, 0.0)).unwrap();
    let mut a = PartDesc::new("A");
    a.opacity = a_opacity;
    let mut b = PartDesc::new("B");
    b.opacity = b_opacity;
    m.add_part(a).unwrap();
    m.add_part(b).unwrap();
    m.add_part(PartDesc::new("ALink")).unwrap();
    m
}

fn two_part_pose(fade_in_time: f32) -> PoseData {
    let mut a = PosePartData::new("A");
    a.links.push("ALink".into());
    PoseData {
        fade_in_time,
        groups: vec![vec![a, PosePartData::new("B")]],
    }
}

fn opacity(m: &ParameterModel, id: &str) -> f32 {
    m.part_opacity(m.part_index(id).unwrap()).unwrap()
}

/// it should fade the visible part in and cap the hidden one under the ceiling
#[test]
fn visible_part_fades_in_hidden_part_drops_to_ceiling() {
    let mut m = model(0.0, 1.0);
    let pose = Pose::new(&two_part_pose(0.5), &m).unwrap();
    pose.update(0.25, &mut m);
    approx(opacity(&m, "A"), 0.5, 1e-6);
    approx(opacity(&m, "B"), 1.0f32.min(hidden_opacity_ceiling(0.5)), 1e-6);
    approx(opacity(&m, "B"), 0.7, 1e-5);
}

/// it should leave a hidden part already below the ceiling untouched
#[test]
fn hidden_part_below_ceiling_is_kept() {
    let mut m = model(0.0, 0.3);
    let pose = Pose::new(&two_part_pose(0.5), &m).unwrap();
    pose.update(0.25, &mut m);
    approx(opacity(&m, "B"), 0.3, 1e-6);
}

/// it should copy the owner's opacity onto linked parts
#[test]
fn linked_parts_mirror_owner() {
    let mut m = model(0.0, 1.0);
    let pose = Pose::new(&two_part_pose(0.5), &m).unwrap();
    pose.update(0.125, &mut m);
    approx(opacity(&m, "ALink"), opacity(&m, "A"), 0.0);
}

/// it should switch visibility when a later part gets flagged
#[test]
fn flag_moves_visibility() {
    let mut m = model(1.0, 0.0);
    let pose = Pose::new(&two_part_pose(0.5), &m).unwrap();
    m.set_value_by_id("A", 0.0, 1.0);
    m.set_value_by_id("B", 1.0, 1.0);
    for _ in 0..10 {
        pose.update(0.1, &mut m);
    }
    approx(opacity(&m, "B"), 1.0, 1e-6);
    approx(opacity(&m, "A"), 0.0, 1e-6);
}

/// it should show the first part when nothing in the group is flagged
#[test]
fn unflagged_group_shows_first_part() {
    let mut m = model(0.2, 0.6);
    m.set_value_by_id("A", 0.0, 1.0);
    let pose = Pose::new(&two_part_pose(0.5), &m).unwrap();
    pose.update(0.01, &mut m);
    approx(opacity(&m, "A"), 1.0, 0.0);
    approx(opacity(&m, "B"), 0.0, 1e-6);
}

/// it should treat a zero fade time as instantaneous and fall back on negative ones
#[test]
fn fade_time_edge_cases() {
    let mut m = model(0.0, 1.0);
    let pose = Pose::new(&two_part_pose(0.0), &m).unwrap();
    pose.update(0.01, &mut m);
    approx(opacity(&m, "A"), 1.0, 0.0);

    let pose = Pose::new(&two_part_pose(-1.0), &m).unwrap();
    approx(pose.fade_in_time(), 0.5, 0.0);
}

/// it should reset groups to their first part
#[test]
fn reset_shows_first_part() {
    let mut m = model(0.0, 1.0);
    m.set_value_by_id("B", 1.0, 1.0);
    let pose = Pose::new(&two_part_pose(0.5), &m).unwrap();
    pose.reset(&mut m);
    approx(opacity(&m, "A"), 1.0, 0.0);
    approx(opacity(&m, "B"), 0.0, 0.0);
    approx(opacity(&m, "ALink"), 1.0, 0.0);
    assert_eq!(m.value_by_id("A"), Some(1.0));
    assert_eq!(m.value_by_id("B"), Some(0.0));
}

/// it should reject empty groups
#[test]
fn empty_group_is_rejected() {
    let m = model(0.0, 1.0);
    let data = PoseData {
        fade_in_time: 0.5,
        groups: vec![vec![], vec![PosePartData::new("A")]],
    };
    assert_eq!(
        Pose::new(&data, &m).unwrap_err(),
        PoseError::EmptyGroup { group: 0 }
    );
}

/// it should bind the shared arms fixture with its shadow links
#[test]
fn arms_fixture_drives_shadows() {
    let desc: ModelDesc = marionette_test_fixtures::models::load("sample").unwrap();
    let mut m = ParameterModel::from_desc(&desc).unwrap();
    let data: PoseData = marionette_test_fixtures::poses::load("arms").unwrap();
    let pose = Pose::new(&data, &m).unwrap();
    pose.reset(&mut m);
    m.set_value_by_id("PartArmA", 0.0, 1.0);
    m.set_value_by_id("PartArmB", 1.0, 1.0);
    for _ in 0..30 {
        pose.update(1.0 / 30.0, &mut m);
    }
    approx(opacity(&m, "PartArmB"), 1.0, 1e-6);
    approx(opacity(&m, "PartArmBShadow"), 1.0, 1e-6);
    approx(opacity(&m, "PartArmAShadow"), opacity(&m, "PartArmA"), 0.0);
}

proptest! {
    /// it should never raise a hidden part's opacity
    #[test]
    fn hidden_opacity_never_increases(
        b0 in 0.0f32..=1.0,
        c0 in 0.0f32..=1.0,
        dts in proptest::collection::vec(0.0f32..0.2, 1..20),
    ) {
        let mut m = model(0.0, b0);
        let mut c = PartDesc::new("C");
        c.opacity = c0;
        m.add_part(c).unwrap();
        let data = PoseData {
            fade_in_time: 0.5,
            groups: vec![vec![
                PosePartData::new("A"),
                PosePartData::new("B"),
                PosePartData::new("C"),
            ]],
        };
        let pose = Pose::new(&data, &m).unwrap();
        for dt in dts {
            let (b, c) = (opacity(&m, "B"), opacity(&m, "C"));
            pose.update(dt, &mut m);
            prop_assert!(opacity(&m, "B") <= b);
            prop_assert!(opacity(&m, "C") <= c);
        }
    }
}
