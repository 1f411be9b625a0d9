use anyhow::Context;
use serde_json::to_string_pretty;

use marionette_animation_core::{Config, ExpressionData, MotionData};
use marionette_api_core::{ModelDesc, ParameterModel};
use marionette_effects_core::{EyeBlinkSettings, LipSyncSettings, PoseData};
use marionette_orchestrator::{Inputs, Orchestrator};
use marionette_physics_core::PhysicsRigData;
use marionette_test_fixtures::puppets;

fn main() -> anyhow::Result<()> {
    let desc: ModelDesc = puppets::model("sample")?;
    let model = ParameterModel::from_desc(&desc)?;
    let motions: Vec<MotionData> = puppets::motions("sample")?;
    let expressions: Vec<ExpressionData> = puppets::expressions("sample")?;
    let physics: PhysicsRigData = puppets::physics("sample")?.context("sample has no physics")?;
    let pose: PoseData = puppets::pose("sample")?.context("sample has no pose")?;

    let mut orch = Orchestrator::new(model)
        .with_motions(Config::default(), motions)?
        .with_expressions(expressions)?
        .with_pose(&pose)?
        .with_physics(&physics)?
        .with_eye_blink(EyeBlinkSettings::default())
        .with_lip_sync(LipSyncSettings::default());

    let inputs = Inputs::from_json(
        r#"{"commands":[
            {"cmd":"play_motion","index":1},
            {"cmd":"play_expression","index":0},
            {"cmd":"lip_sync_envelope","value":0.6}
        ]}"#,
    )?;

    // Step a handful of frames; the first publishes every value.
    let mut frame = orch.step(1.0 / 60.0, inputs)?;
    for _ in 0..30 {
        frame = orch.step(1.0 / 60.0, Inputs::new())?;
    }

    println!("Frame {} writes:\n{}", frame.epoch, to_string_pretty(&frame.writes)?);
    println!("Events:\n{}", to_string_pretty(&frame.events)?);
    Ok(())
}
