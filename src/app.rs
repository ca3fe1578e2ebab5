use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::services::{ClassificationService, ObservationService, VerificationService};

/// Application with the spawned HTTP server
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Application {
    /// Build the application state from config and spawn the server.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let app_state = Self::app_state(&config)?;
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self { server_handle })
    }

    /// Services wired from config, shared with tests and tools
    pub fn app_state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
        info!(
            "Aggregation time budget {:?}, sensitivity threshold {}",
            config.aggregation_timeout(),
            config.sensitivity_threshold
        );

        Ok(AppState {
            observation_service: ObservationService::new(),
            verification_service: VerificationService::new(),
            classification_service: ClassificationService::new(config.sensitivity_threshold)?,
            aggregation_timeout: config.aggregation_timeout(),
        })
    }

    /// Run until the server stops
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
