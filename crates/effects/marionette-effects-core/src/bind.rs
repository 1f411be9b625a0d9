use marionette_api_core::{BlendMode, ParamIndex, ParameterAccess};

/// Resolve parameter ids, dropping the ones the model lacks.
pub(crate) fn bind_parameters(
    effect: &str,
    ids: &[String],
    model: &dyn ParameterAccess,
) -> Vec<ParamIndex> {
    ids.iter()
        .filter_map(|id| {
            let index = model.parameter_index(id);
            if index.is_none() {
                log::debug!("{effect}: parameter '{id}' not in model; skipped");
            }
            index
        })
        .collect()
}

/// Blend one value onto every bound parameter at full weight.
pub(crate) fn write_all(
    params: &[ParamIndex],
    value: f32,
    blend: BlendMode,
    model: &mut dyn ParameterAccess,
) {
    for &param in params {
        model.write(param, value, blend, 1.0);
    }
}
