//! Per-model introspection: registry lookup, synthetic input, parameter
//! and compute-cost counting, with all failures downgraded to error
//! records.

use crate::errors::FlopscopeError;
use crate::model::ModelRegistry;
use crate::profiling::{CostEstimator, SyntheticInput};
use crate::report::AnalysisRecord;
use tracing::warn;

/// Analyze one named model. Never fails: any error along the way (unknown
/// name, shape mismatch, unsupported op) becomes an error record so the
/// batch can continue.
pub fn analyze_model(
    name: &str,
    input_shape: &[usize],
    registry: &ModelRegistry,
    estimator: &dyn CostEstimator,
) -> AnalysisRecord {
    match try_analyze(name, input_shape, registry, estimator) {
        Ok(record) => record,
        Err(e) => {
            warn!(model = name, error = %e, "analysis failed");
            AnalysisRecord::failure(name, e.to_string())
        }
    }
}

fn try_analyze(
    name: &str,
    input_shape: &[usize],
    registry: &ModelRegistry,
    estimator: &dyn CostEstimator,
) -> Result<AnalysisRecord, FlopscopeError> {
    let model = registry.create(name)?;
    let input = SyntheticInput::random(input_shape);
    let total_params = model.param_count(&input.shape)?;
    let cost = estimator.estimate(&model, &input)?;
    Ok(AnalysisRecord::success(name, total_params, cost))
}
