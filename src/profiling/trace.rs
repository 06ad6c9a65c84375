//! Trace-based estimator: records a flat trace of executed ops, MACs
//! counted natively. No breakdowns.

use crate::errors::FlopscopeError;
use crate::model::graph::{Layer, ModelGraph, Shape};
use crate::profiling::{CostEstimate, CostEstimator, SyntheticInput};

/// One executed op in the recorded trace.
#[derive(Debug, Clone)]
pub struct TraceEvent {
    pub op: &'static str,
    pub input_shape: Shape,
    pub output_shape: Shape,
    pub macs: u64,
}

/// Records the forward pass as a list of [TraceEvent]s, then sums MACs
/// over the trace. FLOPs are derived as MACs x 2.
pub struct TraceEstimator;

impl TraceEstimator {
    /// Record the op trace for one forward pass.
    pub fn record(
        &self,
        model: &ModelGraph,
        input: &SyntheticInput,
    ) -> Result<Vec<TraceEvent>, FlopscopeError> {
        let mut events = Vec::new();
        model.walk(&input.shape, &mut |_, layer: &Layer, li, lo| {
            events.push(TraceEvent {
                op: layer.op_name(),
                input_shape: li.clone(),
                output_shape: lo.clone(),
                macs: layer.macs(li, lo),
            });
        })?;
        Ok(events)
    }
}

impl CostEstimator for TraceEstimator {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn estimate(
        &self,
        model: &ModelGraph,
        input: &SyntheticInput,
    ) -> Result<CostEstimate, FlopscopeError> {
        let trace = self.record(model, input)?;
        let total_macs: u64 = trace.iter().map(|e| e.macs).sum();
        Ok(CostEstimate {
            total_flops: total_macs * 2,
            total_macs,
            flops_by_operator: None,
            flops_by_module: None,
        })
    }
}
