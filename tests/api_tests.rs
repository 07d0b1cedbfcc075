//! End-to-end checks of the HTTP surface, driven through the router without
//! binding a socket.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use hiring_predictor::server::{metrics_router, router, HOME_MESSAGE};
use hiring_predictor::{AppState, Applicant, Classifier, ServiceConfig};

struct FixedModel(f64);

impl Classifier for FixedModel {
    fn predict_proba(&self, _applicant: &Applicant) -> anyhow::Result<f64> {
        Ok(self.0)
    }
}

struct BrokenModel;

impl Classifier for BrokenModel {
    fn predict_proba(&self, _applicant: &Applicant) -> anyhow::Result<f64> {
        anyhow::bail!("model exploded")
    }
}

fn valid_payload() -> Value {
    json!({
        "idade": 35,
        "tempo_experiencia": 10,
        "nivel_profissional": "Sênior",
        "nivel_academico": "Ensino Superior Completo",
        "nivel_ingles": "Avançado",
        "nivel_espanhol": "Básico",
        "certificacoes": 3
    })
}

fn state_with(model: impl Classifier + 'static) -> AppState {
    AppState::new(Arc::new(model), &ServiceConfig::default())
}

async fn post_predict(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_home() {
    let app = router(state_with(FixedModel(0.5)));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes, HOME_MESSAGE.as_bytes());
}

#[tokio::test]
async fn test_predict_success() {
    let state = state_with(FixedModel(0.71234));
    let (status, body) = post_predict(router(state.clone()), valid_payload().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let probability = body["probabilidade_contratacao"].as_f64().unwrap();
    assert!((probability - 0.7123).abs() < 1e-12);
    assert_eq!(body["previsao"], json!(1));
    assert!(body["previsao"].is_u64());

    let snapshot = state.metrics.snapshot();
    assert_eq!(snapshot.requests, 1);
    assert_eq!(snapshot.errors, 0);
    assert_eq!(snapshot.latency_count, 1);
    assert_eq!(snapshot.last_prediction, 0.71234);
    assert!((snapshot.drift_score - (0.71234 - 0.62)).abs() < 1e-9);
}

#[tokio::test]
async fn test_predict_below_threshold() {
    let (status, body) = post_predict(router(state_with(FixedModel(0.2))), valid_payload().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["previsao"], json!(0));
}

#[tokio::test]
async fn test_predict_missing_field() {
    let state = state_with(FixedModel(0.5));
    let mut payload = valid_payload();
    payload.as_object_mut().unwrap().remove("certificacoes");

    let (status, body) = post_predict(router(state.clone()), payload.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "erro": "Campo ausente: certificacoes" }));

    let snapshot = state.metrics.snapshot();
    assert_eq!(snapshot.requests, 1);
    assert_eq!(snapshot.errors, 1);
    assert_eq!(state.drift.len().await, 0);
}

#[tokio::test]
async fn test_predict_type_mismatch() {
    let mut payload = valid_payload();
    payload["idade"] = json!("trinta");

    let (status, body) = post_predict(router(state_with(FixedModel(0.5))), payload.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["erro"],
        json!("Tipo inválido para 'idade'. Esperado integer, recebido string")
    );
}

#[tokio::test]
async fn test_predict_integer_beyond_i64_is_client_error() {
    let state = state_with(FixedModel(0.5));
    let mut payload = valid_payload();
    payload["idade"] = json!(u64::MAX);

    let (status, body) = post_predict(router(state.clone()), payload.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["erro"],
        json!("Tipo inválido para 'idade'. Esperado integer, recebido integer out of range")
    );
    assert_eq!(state.drift.len().await, 0);
}

#[tokio::test]
async fn test_predict_malformed_body() {
    let (status, body) = post_predict(router(state_with(FixedModel(0.5))), "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["erro"].is_string());

    let (status, _) = post_predict(router(state_with(FixedModel(0.5))), "[1, 2, 3]").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_model_failure_is_server_error() {
    let state = state_with(BrokenModel);
    let (status, body) = post_predict(router(state.clone()), valid_payload().to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["erro"].as_str().unwrap().contains("model exploded"));
    assert_eq!(state.metrics.snapshot().errors, 1);
}

#[tokio::test]
async fn test_out_of_range_probability_is_server_error() {
    let state = state_with(FixedModel(1.7));
    let (status, _) = post_predict(router(state.clone()), valid_payload().to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(state.drift.len().await, 0);
}

#[tokio::test]
async fn test_drift_accumulates_across_requests() {
    let state = state_with(FixedModel(0.6));
    for _ in 0..3 {
        let (status, _) = post_predict(router(state.clone()), valid_payload().to_string()).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(state.drift.len().await, 3);
    assert!((state.drift.score().await - 0.02).abs() < 1e-9);
    assert_eq!(state.metrics.snapshot().requests, 3);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let state = state_with(FixedModel(0.5));
    post_predict(router(state.clone()), valid_payload().to_string()).await;

    let response = metrics_router(state.metrics.clone())
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("prediction_requests_total 1\n"));
    assert!(text.contains("last_prediction_value 0.5\n"));
    assert!(text.contains("request_processing_seconds_count 1\n"));
}

#[tokio::test]
async fn test_health() {
    let response = router(state_with(FixedModel(0.5)))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["window"], json!(0));
}
