//! Batch analysis: one record per configured model, in order, written to
//! a JSON report after the whole batch completes.

use crate::analyzer::analyze_model;
use crate::config::Configuration;
use crate::errors::FlopscopeError;
use crate::model::ModelRegistry;
use crate::profiling::CostEstimator;
use crate::report::{AnalysisRecord, AnalysisReport};
use std::path::Path;
use tracing::info;

/// Runs every configured model through the analyzer, strictly one at a
/// time so peak memory is bounded by the largest single model. A failed
/// model occupies its slot as an error record; the batch never aborts.
pub struct BatchRunner<'a> {
    registry: &'a ModelRegistry,
    estimator: Box<dyn CostEstimator>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(registry: &'a ModelRegistry, estimator: Box<dyn CostEstimator>) -> Self {
        Self {
            registry,
            estimator,
        }
    }

    /// Analyze all configured models in configuration order.
    pub fn run(&self, config: &Configuration, input_shape: &[usize]) -> AnalysisReport {
        let mut records = Vec::with_capacity(config.models.len());
        for name in &config.models {
            println!("Analyzing model: {}", name);
            let record: AnalysisRecord =
                analyze_model(name, input_shape, self.registry, self.estimator.as_ref());
            records.push(record);
        }
        AnalysisReport::new(records)
    }

    /// Run the batch and write the report. An empty model list is a clean
    /// no-op: nothing is analyzed and no file is written.
    pub fn run_to_file(
        &self,
        config: &Configuration,
        input_shape: &[usize],
        output: &Path,
    ) -> Result<Option<AnalysisReport>, FlopscopeError> {
        if config.models.is_empty() {
            println!("No models specified in the configuration file.");
            return Ok(None);
        }
        info!(
            models = config.models.len(),
            estimator = self.estimator.name(),
            "starting batch analysis"
        );
        let report = self.run(config, input_shape);
        report.save(output)?;
        println!("Analysis completed. Results saved to {}", output.display());
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiling::EstimatorKind;

    const SHAPE: [usize; 4] = [1, 3, 224, 224];

    fn runner(registry: &ModelRegistry) -> BatchRunner<'_> {
        BatchRunner::new(registry, EstimatorKind::Hook.build())
    }

    fn config(models: &[&str]) -> Configuration {
        Configuration {
            models: models.iter().map(|s| s.to_string()).collect(),
            estimator: EstimatorKind::Hook,
        }
    }

    #[test]
    fn one_record_per_model_in_order() {
        let registry = ModelRegistry::builtin();
        let report = runner(&registry).run(&config(&["simple_cnn", "bogus", "resnet18"]), &SHAPE);
        let names: Vec<&str> = report.records.iter().map(|r| r.model_name.as_str()).collect();
        assert_eq!(names, vec!["simple_cnn", "bogus", "resnet18"]);
        assert!(!report.records[0].is_error());
        assert!(report.records[1].is_error());
        assert!(!report.records[2].is_error());
        assert!(report.records.iter().all(|r| r.is_consistent()));
    }

    #[test]
    fn empty_model_list_writes_nothing() {
        let registry = ModelRegistry::builtin();
        let output = std::env::temp_dir().join("flopscope_batch_empty.json");
        let _ = std::fs::remove_file(&output);
        let result = runner(&registry)
            .run_to_file(&config(&[]), &SHAPE, &output)
            .unwrap();
        assert!(result.is_none());
        assert!(!output.exists());
    }

    #[test]
    fn run_to_file_roundtrips() {
        let registry = ModelRegistry::builtin();
        let output = std::env::temp_dir().join("flopscope_batch_roundtrip.json");
        let report = runner(&registry)
            .run_to_file(&config(&["simple_cnn", "bogus"]), &SHAPE, &output)
            .unwrap()
            .unwrap();
        let loaded = AnalysisReport::load(&output).unwrap();
        assert_eq!(loaded, report);
        assert_eq!(loaded.valid_records().len(), 1);
        let _ = std::fs::remove_file(&output);
    }
}
