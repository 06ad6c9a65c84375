//! # flopscope
//!
//! Parameter and FLOP analysis for a built-in model zoo, with JSON reports
//! and chart rendering.
//!
//! ## Pipeline
//!
//! - **Config**: YAML list of model names plus estimator selection
//! - **Model zoo**: named architectures described as analytic layer graphs
//!   (ResNet, VGG, ViT); parameter and MAC counts computed exactly from
//!   shapes, no weights materialized
//! - **Estimators**: hook-based (FLOPs native, per-operator/per-module
//!   breakdowns) and trace-based (MACs native), interchangeable
//! - **Batch**: one record per model in configuration order, failures
//!   recorded as data, pretty-printed JSON report
//! - **Render**: bar charts and a summary table composed into a grid PNG

pub mod analyzer;
pub mod batch;
pub mod config;
pub mod errors;
pub mod model;
pub mod profiling;
pub mod render;
pub mod report;

pub use analyzer::analyze_model;
pub use batch::BatchRunner;
pub use config::{load_config, parse_input_shape, Configuration};
pub use errors::FlopscopeError;
pub use model::{ModelGraph, ModelRegistry};
pub use profiling::{
    CostEstimate, CostEstimator, EstimatorKind, HookEstimator, SyntheticInput, TraceEstimator,
};
pub use render::{render_report, RenderContext};
pub use report::{AnalysisRecord, AnalysisReport};
