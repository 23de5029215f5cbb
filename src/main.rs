use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use market_plot::api::candles::CandlesClient;
use market_plot::config::{Config, SourceKind};
use market_plot::services::{plot_service, ApiSource, CsvSource, DataSource};
use market_plot::utils::PlotError;

fn build_source(source: &SourceKind) -> Box<dyn DataSource> {
    match source {
        SourceKind::Csv { path, schema } => Box::new(CsvSource::new(path.clone(), schema.clone())),
        SourceKind::Api { base_url } => {
            Box::new(ApiSource::new(CandlesClient::with_base_url(base_url.clone())))
        }
    }
}

async fn run() -> Result<(), PlotError> {
    let config = Config::from_env()?;
    let source = build_source(&config.source);

    let output = plot_service::run(source.as_ref(), &config.request, &config.chart, &config.output).await?;
    info!("📈 Chart saved to {}", output.display());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("market_plot=info".parse().expect("valid directive"))
                .add_directive("reqwest=warn".parse().expect("valid directive")),
        )
        .with_target(true)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run aborted: {}", e);
            println!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
