//! Analysis records and the JSON report file.

use crate::errors::FlopscopeError;
use crate::profiling::CostEstimate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Per-model analysis result. Exactly one of the numeric side or the
/// `error` field is present; absent fields are omitted from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_params: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_flops: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_macs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gflops: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmacs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flops_by_operator: Option<BTreeMap<String, u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flops_by_module: Option<BTreeMap<String, u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisRecord {
    /// Successful analysis: all numeric fields filled from the estimate.
    pub fn success(model_name: impl Into<String>, total_params: u64, cost: CostEstimate) -> Self {
        Self {
            model_name: model_name.into(),
            total_params: Some(total_params),
            total_flops: Some(cost.total_flops),
            total_macs: Some(cost.total_macs),
            gflops: Some(cost.total_flops as f64 / 1e9),
            gmacs: Some(cost.total_macs as f64 / 1e9),
            flops_by_operator: cost.flops_by_operator,
            flops_by_module: cost.flops_by_module,
            error: None,
        }
    }

    /// Failed analysis: only the name and the error message.
    pub fn failure(model_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            total_params: None,
            total_flops: None,
            total_macs: None,
            gflops: None,
            gmacs: None,
            flops_by_operator: None,
            flops_by_module: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Invariant check: either the error field alone, or all core numeric
    /// fields, never a mixture.
    pub fn is_consistent(&self) -> bool {
        let numeric = [
            self.total_params.is_some(),
            self.total_flops.is_some(),
            self.total_macs.is_some(),
            self.gflops.is_some(),
            self.gmacs.is_some(),
        ];
        if self.error.is_some() {
            numeric.iter().all(|present| !present)
        } else {
            numeric.iter().all(|present| *present)
        }
    }
}

/// Ordered sequence of records, one per configured model. Serializes as a
/// bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisReport {
    pub records: Vec<AnalysisRecord>,
}

impl AnalysisReport {
    pub fn new(records: Vec<AnalysisRecord>) -> Self {
        Self { records }
    }

    /// Write the report as pretty-printed JSON (2-space indent, UTF-8).
    pub fn save(&self, path: &Path) -> Result<(), FlopscopeError> {
        let json = serde_json::to_string_pretty(&self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a report back wholesale.
    pub fn load(path: &Path) -> Result<Self, FlopscopeError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Records that carry metrics (error records filtered out).
    pub fn valid_records(&self) -> Vec<&AnalysisRecord> {
        self.records.iter().filter(|r| !r.is_error()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cost() -> CostEstimate {
        CostEstimate {
            total_flops: 2_000_000_000,
            total_macs: 1_000_000_000,
            flops_by_operator: None,
            flops_by_module: None,
        }
    }

    #[test]
    fn success_record_is_consistent() {
        let rec = AnalysisRecord::success("a", 1_000_000, sample_cost());
        assert!(rec.is_consistent());
        assert!(!rec.is_error());
        assert_eq!(rec.gflops, Some(2.0));
        assert_eq!(rec.gmacs, Some(1.0));
    }

    #[test]
    fn failure_record_is_consistent() {
        let rec = AnalysisRecord::failure("b", "Unknown model: 'b'");
        assert!(rec.is_consistent());
        assert!(rec.is_error());
        assert!(rec.total_params.is_none());
    }

    #[test]
    fn failure_record_serializes_name_and_error_only() {
        let rec = AnalysisRecord::failure("b", "boom");
        let json = serde_json::to_value(&rec).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["model_name"], "b");
        assert_eq!(obj["error"], "boom");
    }

    #[test]
    fn report_serializes_as_json_array() {
        let report = AnalysisReport::new(vec![
            AnalysisRecord::success("a", 1_000_000, sample_cost()),
            AnalysisRecord::failure("b", "boom"),
        ]);
        let json = serde_json::to_string_pretty(&report).unwrap();
        assert!(json.trim_start().starts_with('['));
        assert_eq!(report.valid_records().len(), 1);
    }

    #[test]
    fn report_roundtrips_through_file() {
        let report = AnalysisReport::new(vec![
            AnalysisRecord::success("a", 1_000_000, sample_cost()),
            AnalysisRecord::failure("b", "boom"),
        ]);
        let path = std::env::temp_dir().join("flopscope_report_roundtrip.json");
        report.save(&path).unwrap();
        let loaded = AnalysisReport::load(&path).unwrap();
        assert_eq!(loaded, report);
        let _ = std::fs::remove_file(&path);
    }
}
