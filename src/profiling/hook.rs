//! Hook-based estimator: per-layer callback with operator and module
//! breakdowns, FLOPs counted natively.

use crate::errors::FlopscopeError;
use crate::model::graph::ModelGraph;
use crate::profiling::{CostEstimate, CostEstimator, SyntheticInput};
use std::collections::BTreeMap;

/// Walks the model graph once, accumulating FLOPs per operator kind and
/// per top-level module as each layer is visited. MACs are derived as
/// FLOPs / 2.
pub struct HookEstimator;

impl CostEstimator for HookEstimator {
    fn name(&self) -> &'static str {
        "hook"
    }

    fn estimate(
        &self,
        model: &ModelGraph,
        input: &SyntheticInput,
    ) -> Result<CostEstimate, FlopscopeError> {
        let mut total_flops = 0u64;
        let mut by_operator: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_module: BTreeMap<String, u64> = BTreeMap::new();

        model.walk(&input.shape, &mut |stage, layer, li, lo| {
            let flops = layer.macs(li, lo) * 2;
            if flops == 0 {
                return;
            }
            total_flops += flops;
            *by_operator.entry(layer.op_name().to_string()).or_default() += flops;
            *by_module.entry(stage.to_string()).or_default() += flops;
        })?;

        Ok(CostEstimate {
            total_flops,
            total_macs: total_flops / 2,
            flops_by_operator: Some(by_operator),
            flops_by_module: Some(by_module),
        })
    }
}
