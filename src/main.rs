use dotenvy::dotenv;
use shopgen::{
    config::{DatabaseConfig, generation},
    core::pipeline,
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; settings may also come from the real environment
    dotenv().ok();

    // 3. Settings
    let generation_config = generation::load_default_config()
        .inspect_err(|e| error!("Invalid generation settings: {}", e))?;
    let db_config =
        DatabaseConfig::from_env().inspect_err(|e| error!("Invalid database settings: {}", e))?;

    info!("E-commerce Analytics ETL Pipeline");

    // 4. Generate, back up, load, summarize
    let outcome = pipeline::run(&generation_config, &db_config)
        .await
        .inspect_err(|e| error!("Pipeline aborted: {}", e))?;

    if let Some(summary) = &outcome.summary {
        info!("\n{summary}");
    }
    if outcome.is_success() {
        info!("ETL pipeline completed successfully (seed {})", outcome.seed);
    } else {
        warn!(
            "ETL pipeline finished with errors (seed {}); see log above",
            outcome.seed
        );
    }
    info!("Time elapsed: {:.2} seconds", outcome.elapsed.as_secs_f64());

    Ok(())
}
