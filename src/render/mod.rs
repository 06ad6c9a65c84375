//! Report rendering: bar charts and a summary table composed into a grid
//! PNG, plus the individual images.
//!
//! Paths are fixed: the report is read from [REPORT_PATH] and the four
//! images land in the working directory.

pub mod charts;
pub mod grid;

pub use charts::{bar_chart, gflops_bar_spec, params_bar_spec, table_chart, table_rows, BarSpec};

use crate::errors::FlopscopeError;
use crate::report::{AnalysisRecord, AnalysisReport};
use charming::{Chart, ImageFormat, ImageRenderer};
use grid::{compose_grid, decode_png, resize_to, GRID_COLUMNS, GRID_PADDING};
use std::path::Path;
use tracing::info;

/// Fixed input path of the report to render.
pub const REPORT_PATH: &str = "caformer/model_analysis.json";
/// Output image filenames, written to the working directory.
pub const GRID_IMAGE: &str = "model_analysis_grid.png";
pub const PARAMS_IMAGE: &str = "model_parameters.png";
pub const GFLOPS_IMAGE: &str = "model_gflops.png";
pub const TABLE_IMAGE: &str = "model_table.png";

/// Rendering context for one render call: chart canvas size and the
/// renderer it feeds. Dropped when the call returns.
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one chart to PNG bytes.
    pub fn chart_to_png(&self, chart: &Chart) -> Result<Vec<u8>, FlopscopeError> {
        ImageRenderer::new(self.width, self.height)
            .render_format(ImageFormat::Png, chart)
            .map_err(|e| FlopscopeError::Render(format!("{:?}", e)))
    }
}

/// Load a report and drop its error records.
pub fn load_valid_records(path: &Path) -> Result<Vec<AnalysisRecord>, FlopscopeError> {
    let report = AnalysisReport::load(path)?;
    Ok(report.valid_records().into_iter().cloned().collect())
}

/// Render the report at `report_path`. Returns false (writing nothing)
/// when no valid records survive filtering.
pub fn render_report(report_path: &Path, ctx: &RenderContext) -> Result<bool, FlopscopeError> {
    let records = load_valid_records(report_path)?;
    if records.is_empty() {
        println!("No valid models found in the report.");
        return Ok(false);
    }
    info!(models = records.len(), "rendering report");

    let charts = [
        bar_chart(&params_bar_spec(&records)?),
        bar_chart(&gflops_bar_spec(&records)?),
        table_chart(&table_rows(&records)?),
    ];
    let mut images = Vec::with_capacity(charts.len());
    for chart in &charts {
        images.push(decode_png(&ctx.chart_to_png(chart)?)?);
    }

    // The first image's dimensions are the reference size for all.
    let (w, h) = images[0].dimensions();
    let images: Vec<_> = images.iter().map(|img| resize_to(img, w, h)).collect();

    let grid = compose_grid(&images, GRID_COLUMNS, GRID_PADDING);
    save_png(&grid, GRID_IMAGE)?;
    println!("Saved grid image to {}", GRID_IMAGE);

    for (img, name) in images.iter().zip([PARAMS_IMAGE, GFLOPS_IMAGE, TABLE_IMAGE]) {
        save_png(img, name)?;
    }
    println!("Saved individual plots as well.");
    Ok(true)
}

fn save_png(img: &image::RgbaImage, path: &str) -> Result<(), FlopscopeError> {
    img.save(path)
        .map_err(|e| FlopscopeError::Render(format!("{}: {}", path, e)))
}
