use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use groundwater_insight::app::Application;
use groundwater_insight::config::Config;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,groundwater_insight=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    info!("Starting groundwater insight service with config: {:?}", config);

    let app = Application::build(config).await?;
    app.run_until_stopped().await
}
