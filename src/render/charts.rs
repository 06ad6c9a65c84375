//! Chart construction: per-metric bar charts and the summary table.

use crate::errors::FlopscopeError;
use crate::report::AnalysisRecord;
use charming::component::{Axis, Title};
use charming::element::{
    AxisLabel, AxisType, Formatter, JsFunction, Label, LabelPosition, TextStyle,
};
use charming::series::Bar;
use charming::Chart;

/// Data for one bar chart: one bar per model.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    pub title: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl BarSpec {
    /// Per-bar value annotations, formatted the way the chart renders them.
    pub fn annotations(&self) -> Vec<String> {
        self.values.iter().map(|v| format!("{:.2}", v)).collect()
    }
}

fn require<T: Copy>(value: Option<T>, field: &str, record: &AnalysisRecord) -> Result<T, FlopscopeError> {
    value.ok_or_else(|| {
        FlopscopeError::ReportSchema(format!(
            "record '{}' is missing field '{}'",
            record.model_name, field
        ))
    })
}

/// Parameter-count chart, rescaled to millions.
pub fn params_bar_spec(records: &[AnalysisRecord]) -> Result<BarSpec, FlopscopeError> {
    let mut labels = Vec::with_capacity(records.len());
    let mut values = Vec::with_capacity(records.len());
    for rec in records {
        labels.push(rec.model_name.clone());
        values.push(require(rec.total_params, "total_params", rec)? as f64 / 1e6);
    }
    Ok(BarSpec {
        title: "Model Parameters".to_string(),
        y_label: "Parameters (M)".to_string(),
        labels,
        values,
    })
}

/// GFLOPs chart.
pub fn gflops_bar_spec(records: &[AnalysisRecord]) -> Result<BarSpec, FlopscopeError> {
    let mut labels = Vec::with_capacity(records.len());
    let mut values = Vec::with_capacity(records.len());
    for rec in records {
        labels.push(rec.model_name.clone());
        values.push(require(rec.gflops, "gflops", rec)?);
    }
    Ok(BarSpec {
        title: "Model GFLOPs".to_string(),
        y_label: "GFLOPs".to_string(),
        labels,
        values,
    })
}

/// Bar chart with rotated x labels and a 2-decimal annotation above each bar.
pub fn bar_chart(spec: &BarSpec) -> Chart {
    Chart::new()
        .background_color("white")
        .title(Title::new().text(spec.title.clone()).left("center"))
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(spec.labels.clone())
                .axis_label(AxisLabel::new().rotate(45.0)),
        )
        .y_axis(Axis::new().type_(AxisType::Value).name(spec.y_label.clone()))
        .series(
            Bar::new().data(spec.values.clone()).label(
                Label::new()
                    .show(true)
                    .position(LabelPosition::Top)
                    .formatter(Formatter::Function(JsFunction::new_with_args(
                        "params",
                        "return Number(params.value).toFixed(2);",
                    ))),
            ),
        )
}

/// One formatted table row: model name, parameters in millions, GFLOPs.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub name: String,
    pub params_m: String,
    pub gflops: String,
}

pub const TABLE_HEADERS: [&str; 3] = ["Model", "Params (M)", "GFLOPs"];

/// Formatted table rows (2 decimal places, as in the rendered image).
pub fn table_rows(records: &[AnalysisRecord]) -> Result<Vec<TableRow>, FlopscopeError> {
    records
        .iter()
        .map(|rec| {
            let params = require(rec.total_params, "total_params", rec)? as f64 / 1e6;
            let gflops = require(rec.gflops, "gflops", rec)?;
            Ok(TableRow {
                name: rec.model_name.clone(),
                params_m: format!("{:.2}", params),
                gflops: format!("{:.2}", gflops),
            })
        })
        .collect()
}

const TABLE_COLUMNS: [&str; 3] = ["8%", "45%", "72%"];

/// Table rendered as positioned text cells on a blank chart.
pub fn table_chart(rows: &[TableRow]) -> Chart {
    let mut chart = Chart::new().background_color("white");
    for (text, left) in TABLE_HEADERS.iter().zip(TABLE_COLUMNS) {
        chart = chart.title(
            Title::new()
                .text(*text)
                .left(left)
                .top("6%")
                .text_style(TextStyle::new().font_size(18)),
        );
    }
    for (i, row) in rows.iter().enumerate() {
        let top = format!("{}%", 16 + i * 8);
        for (text, left) in [&row.name, &row.params_m, &row.gflops].iter().zip(TABLE_COLUMNS) {
            chart = chart.title(
                Title::new()
                    .text(text.as_str())
                    .left(left)
                    .top(top.as_str())
                    .text_style(TextStyle::new().font_size(16)),
            );
        }
    }
    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiling::CostEstimate;

    fn record(name: &str, params: u64, flops: u64) -> AnalysisRecord {
        AnalysisRecord::success(
            name,
            params,
            CostEstimate {
                total_flops: flops,
                total_macs: flops / 2,
                flops_by_operator: None,
                flops_by_module: None,
            },
        )
    }

    #[test]
    fn params_spec_rescales_to_millions() {
        let records = vec![record("a", 1_000_000, 2_000_000_000)];
        let spec = params_bar_spec(&records).unwrap();
        assert_eq!(spec.labels, vec!["a"]);
        assert_eq!(spec.values, vec![1.0]);
        assert_eq!(spec.annotations(), vec!["1.00"]);
        assert_eq!(spec.y_label, "Parameters (M)");
    }

    #[test]
    fn gflops_spec_uses_gflops_field() {
        let records = vec![record("a", 1_000_000, 2_000_000_000)];
        let spec = gflops_bar_spec(&records).unwrap();
        assert_eq!(spec.values, vec![2.0]);
        assert_eq!(spec.annotations(), vec!["2.00"]);
    }

    #[test]
    fn specs_are_deterministic_for_same_records() {
        let records = vec![
            record("a", 11_689_512, 3_600_000_000),
            record("b", 25_557_032, 8_200_000_000),
        ];
        assert_eq!(
            params_bar_spec(&records).unwrap(),
            params_bar_spec(&records).unwrap()
        );
        assert_eq!(
            gflops_bar_spec(&records).unwrap(),
            gflops_bar_spec(&records).unwrap()
        );
    }

    #[test]
    fn missing_field_is_schema_error() {
        let mut rec = record("a", 1_000_000, 2_000_000_000);
        rec.gflops = None;
        let r = gflops_bar_spec(&[rec]);
        assert!(matches!(r, Err(FlopscopeError::ReportSchema(_))));
    }

    #[test]
    fn table_rows_format_two_decimals() {
        let records = vec![record("resnet18", 11_689_512, 3_628_000_000)];
        let rows = table_rows(&records).unwrap();
        assert_eq!(rows[0].name, "resnet18");
        assert_eq!(rows[0].params_m, "11.69");
        assert_eq!(rows[0].gflops, "3.63");
    }

    #[test]
    fn charts_build_without_panicking() {
        let records = vec![record("a", 1_000_000, 2_000_000_000)];
        let spec = params_bar_spec(&records).unwrap();
        let _ = bar_chart(&spec);
        let _ = table_chart(&table_rows(&records).unwrap());
    }
}
