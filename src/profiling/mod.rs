//! Compute-cost estimation for one forward pass.
//!
//! Two interchangeable estimators produce the same totals through
//! different accounting: [HookEstimator] visits every layer with a
//! callback and counts FLOPs natively (with per-operator and per-module
//! breakdowns), [TraceEstimator] records a flat trace of executed ops and
//! counts MACs natively. Whichever unit an estimator does not measure is
//! derived through the MACs = FLOPs / 2 convention, an approximation that
//! is exact for convolution and linear layers and merely conventional for
//! everything else.

pub mod hook;
pub mod trace;

pub use hook::HookEstimator;
pub use trace::TraceEstimator;

use crate::errors::FlopscopeError;
use crate::model::graph::{numel, ModelGraph, Shape};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Random input tensor fed to the analyzed forward pass. Discarded after
/// the record is produced.
#[derive(Debug, Clone)]
pub struct SyntheticInput {
    pub shape: Shape,
    pub data: Vec<f32>,
}

impl SyntheticInput {
    /// Uniform random tensor of the given shape.
    pub fn random(shape: &[usize]) -> Self {
        let mut rng = rand::thread_rng();
        let n = numel(shape) as usize;
        let data = (0..n).map(|_| rng.gen::<f32>()).collect();
        Self {
            shape: shape.to_vec(),
            data,
        }
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }
}

/// Cost estimate for one forward pass. Breakdowns are present only for
/// estimators that track them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostEstimate {
    pub total_flops: u64,
    pub total_macs: u64,
    pub flops_by_operator: Option<BTreeMap<String, u64>>,
    pub flops_by_module: Option<BTreeMap<String, u64>>,
}

/// A compute-cost estimator: model + input -> [CostEstimate].
pub trait CostEstimator {
    fn name(&self) -> &'static str;

    fn estimate(
        &self,
        model: &ModelGraph,
        input: &SyntheticInput,
    ) -> Result<CostEstimate, FlopscopeError>;
}

/// Estimator selection, set in the run configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    #[default]
    Hook,
    Trace,
}

impl EstimatorKind {
    pub fn build(self) -> Box<dyn CostEstimator> {
        match self {
            EstimatorKind::Hook => Box::new(HookEstimator),
            EstimatorKind::Trace => Box::new(TraceEstimator),
        }
    }
}
