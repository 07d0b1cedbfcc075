//! Hiring Probability Service
//!
//! Loads the trained model artifact and serves `/predict` alongside a
//! separate Prometheus metrics listener.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use hiring_predictor::server::{run_server, AppState};
use hiring_predictor::telemetry::init_logging;
use hiring_predictor::{LogisticModel, ServiceConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = ServiceConfig::from_env()?;
    let _log_guard = init_logging(&config)?;

    info!(
        "Starting hiring prediction service (threshold {}, baseline {}, window {})",
        config.threshold, config.baseline_mean, config.drift_window
    );

    let model = LogisticModel::load(&config.model_path)
        .with_context(|| format!("Failed to load model from '{}'", config.model_path.display()))?;
    info!("📦 Model loaded from '{}'", config.model_path.display());

    let state = AppState::new(Arc::new(model), &config);
    run_server(&config, state).await
}
