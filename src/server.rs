use axum::{
    body::Bytes,
    extract::{Json, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServiceConfig;
use crate::drift::DriftTracker;
use crate::error::PredictError;
use crate::metrics::ServiceMetrics;
use crate::model::{Applicant, Classifier, Prediction};
use crate::validation::FieldSchema;

pub const HOME_MESSAGE: &str = "✅ API de Previsão de Contratação está rodando.";

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn Classifier>,
    pub schema: Arc<FieldSchema>,
    pub drift: Arc<DriftTracker>,
    pub metrics: Arc<ServiceMetrics>,
    pub threshold: f64,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(model: Arc<dyn Classifier>, config: &ServiceConfig) -> Self {
        Self {
            model,
            schema: Arc::new(FieldSchema::applicant()),
            drift: Arc::new(DriftTracker::new(config.drift_window, config.baseline_mean)),
            metrics: Arc::new(ServiceMetrics::new()),
            threshold: config.threshold,
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub probabilidade_contratacao: f64,
    pub previsao: u8,
}

impl From<Prediction> for PredictResponse {
    fn from(p: Prediction) -> Self {
        Self {
            probabilidade_contratacao: (p.probability * 10_000.0).round() / 10_000.0,
            previsao: p.class,
        }
    }
}

/// Prediction API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router for the separate metrics listener
pub fn metrics_router(metrics: Arc<ServiceMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(metrics)
}

pub async fn run_server(config: &ServiceConfig, state: AppState) -> Result<()> {
    let metrics_listener = tokio::net::TcpListener::bind(config.metrics_addr()).await?;
    info!("📈 Metrics listening at http://{}/metrics", config.metrics_addr());
    let metrics_app = metrics_router(state.metrics.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, metrics_app).await {
            error!("Metrics server stopped: {}", e);
        }
    });

    let listener = tokio::net::TcpListener::bind(config.api_addr()).await?;
    info!("🚀 Prediction API listening at http://{}", config.api_addr());
    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn home() -> &'static str {
    HOME_MESSAGE
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let window = state.drift.len().await;
    Json(serde_json::json!({
        "status": "ok",
        "started_at": state.started_at.to_rfc3339(),
        "window": window,
    }))
}

async fn metrics_handler(State(metrics): State<Arc<ServiceMetrics>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        metrics.render(),
    )
}

async fn predict(State(state): State<AppState>, body: Bytes) -> Result<Json<PredictResponse>, PredictError> {
    let started = Instant::now();
    state.metrics.inc_requests();

    let result = handle_predict(&state, &body).await;

    state.metrics.observe_latency(started.elapsed());
    if let Err(e) = &result {
        state.metrics.inc_errors();
        match e {
            PredictError::MalformedBody(_) | PredictError::Validation(_) => {
                warn!("Rejected prediction request: {}", e)
            }
            _ => error!("Prediction failed: {}", e),
        }
    }

    result.map(Json)
}

async fn handle_predict(state: &AppState, body: &[u8]) -> Result<PredictResponse, PredictError> {
    let attributes = parse_attributes(body)?;
    let payload = Value::Object(attributes.clone());
    info!("Received prediction request: {}", payload);

    let attributes = state.schema.validate(&attributes)?;
    let applicant = Applicant::from_attributes(attributes).map_err(PredictError::Inference)?;
    let probability = state
        .model
        .predict_proba(&applicant)
        .map_err(PredictError::Inference)?;

    let drift_score = state
        .drift
        .record_and_publish(probability, |score| {
            state.metrics.set_drift_score(score);
            state.metrics.set_last_prediction(probability);
        })
        .await?;

    let prediction = Prediction::from_probability(probability, state.threshold);
    info!(
        "Predicted probability: {}, class: {}, drift: {:.4}",
        prediction.probability, prediction.class, drift_score
    );

    Ok(prediction.into())
}

fn parse_attributes(body: &[u8]) -> Result<Map<String, Value>, PredictError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(PredictError::MalformedBody(format!(
            "esperado um objeto JSON, recebido {}",
            crate::validation::json_kind(&other)
        ))),
        Err(e) => Err(PredictError::MalformedBody(e.to_string())),
    }
}
