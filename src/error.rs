//! Errors surfaced by the prediction endpoint.
//!
//! Client mistakes map to 400, model and server failures to 500. Every
//! response body uses the `{"erro": "<message>"}` shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::drift::DriftError;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Corpo da requisição inválido: {0}")]
    MalformedBody(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Falha na inferência: {0:#}")]
    Inference(anyhow::Error),
    #[error(transparent)]
    Drift(#[from] DriftError),
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictError::MalformedBody(_) | PredictError::Validation(_) => StatusCode::BAD_REQUEST,
            PredictError::Inference(_) | PredictError::Drift(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        (self.status(), Json(serde_json::json!({ "erro": self.to_string() }))).into_response()
    }
}
