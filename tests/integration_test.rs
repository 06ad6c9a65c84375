//! Integration tests: config to report pipeline, report filtering, and
//! the chart inputs derived from a mixed success/failure batch.

use flopscope::model::graph::{Layer, ModelGraph, Module, Stage};
use flopscope::render::{load_valid_records, params_bar_spec};
use flopscope::{
    load_config, AnalysisReport, BatchRunner, Configuration, EstimatorKind, ModelRegistry,
};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

#[test]
fn config_to_report_pipeline() {
    let config_path = temp_path("flopscope_it_config.yaml");
    std::fs::write(
        &config_path,
        "models:\n  - simple_cnn\n  - no_such_model\n  - resnet18\nestimator: trace\n",
    )
    .unwrap();
    let config = load_config(&config_path).unwrap();
    assert_eq!(config.estimator, EstimatorKind::Trace);

    let registry = ModelRegistry::builtin();
    let runner = BatchRunner::new(&registry, config.estimator.build());
    let output = temp_path("flopscope_it_report.json");
    let report = runner
        .run_to_file(&config, &[1, 3, 224, 224], &output)
        .unwrap()
        .unwrap();

    assert_eq!(report.records.len(), 3);
    let names: Vec<&str> = report
        .records
        .iter()
        .map(|r| r.model_name.as_str())
        .collect();
    assert_eq!(names, vec!["simple_cnn", "no_such_model", "resnet18"]);
    assert!(report.records.iter().all(|r| r.is_consistent()));
    assert!(report.records[1].is_error());

    let loaded = AnalysisReport::load(&output).unwrap();
    assert_eq!(loaded, report);

    let valid = load_valid_records(&output).unwrap();
    assert_eq!(valid.len(), 2);

    let _ = std::fs::remove_file(&config_path);
    let _ = std::fs::remove_file(&output);
}

// Fixed-size model used to pin exact report numbers: a single bias-free
// 1000x1000 linear over (1, 1000, 1000) gives 1,000,000 parameters and
// 1,000,000,000 MACs.
fn fixture_model() -> ModelGraph {
    ModelGraph {
        name: "a".to_string(),
        stages: vec![Stage {
            name: "fc".to_string(),
            module: Module::Layer(Layer::Linear {
                out_features: 1000,
                bias: false,
            }),
        }],
    }
}

#[test]
fn mixed_batch_matches_expected_records_and_chart() {
    let mut registry = ModelRegistry::new();
    registry.register("a", fixture_model);

    let config = Configuration {
        models: vec!["a".to_string(), "b".to_string()],
        estimator: EstimatorKind::Hook,
    };
    let runner = BatchRunner::new(&registry, config.estimator.build());
    let report = runner.run(&config, &[1, 1000, 1000]);

    let a = &report.records[0];
    assert_eq!(a.total_params, Some(1_000_000));
    assert_eq!(a.total_flops, Some(2_000_000_000));
    assert_eq!(a.total_macs, Some(1_000_000_000));
    assert_eq!(a.gflops, Some(2.0));
    assert_eq!(a.gmacs, Some(1.0));

    let b = &report.records[1];
    assert!(b.is_error());
    assert_eq!(b.model_name, "b");

    // Renderer input: a single bar for "a" annotated "1.00" on the
    // millions-of-parameters chart.
    let valid: Vec<_> = report.valid_records().into_iter().cloned().collect();
    let spec = params_bar_spec(&valid).unwrap();
    assert_eq!(spec.labels, vec!["a"]);
    assert_eq!(spec.annotations(), vec!["1.00"]);
}

#[test]
fn rerun_on_unchanged_report_yields_identical_chart_inputs() {
    let registry = ModelRegistry::builtin();
    let config = Configuration {
        models: vec!["simple_cnn".to_string(), "resnet18".to_string()],
        estimator: EstimatorKind::Hook,
    };
    let runner = BatchRunner::new(&registry, config.estimator.build());
    let output = temp_path("flopscope_it_idempotent.json");
    runner
        .run_to_file(&config, &[1, 3, 224, 224], &output)
        .unwrap();

    let first = params_bar_spec(&load_valid_records(&output).unwrap()).unwrap();
    let second = params_bar_spec(&load_valid_records(&output).unwrap()).unwrap();
    assert_eq!(first, second);

    let _ = std::fs::remove_file(&output);
}
