use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::chart_service::{plan_overlay, render_chart};
use super::data_source::{DataSource, FetchRequest};
use crate::models::ChartOptions;
use crate::utils::PlotError;

/// Load a dataset from `source` and write the overlay chart to `output`
///
/// Any failure ends the run before the output file is touched.
pub async fn run(
    source: &dyn DataSource,
    request: &FetchRequest,
    options: &ChartOptions,
    output: &Path,
) -> Result<PathBuf, PlotError> {
    info!("Loading market data from {} source", source.name());
    let dataset = source.fetch(request).await?;
    if dataset.is_empty() {
        warn!("No series matched the request, the chart will be empty");
    }

    let plan = plan_overlay(&dataset);
    let skipped = dataset.len() - plan.lines.len();
    info!(
        "Plotting {} series ({} empty skipped)",
        plan.lines.len(),
        skipped
    );

    render_chart(&plan, options, output)?;
    Ok(output.to_path_buf())
}
