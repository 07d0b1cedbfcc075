//! Hiring Probability Service
//!
//! Serves a pre-trained hiring classifier over HTTP:
//! - Schema validation of applicant payloads
//! - One-hot logistic regression inference
//! - Sliding-window prediction drift tracking
//! - Prometheus-style operational metrics

pub mod config;
pub mod drift;
pub mod error;
pub mod metrics;
pub mod model;
pub mod server;
pub mod telemetry;
pub mod validation;

// Re-exports for convenience
pub use config::ServiceConfig;
pub use drift::{DriftTracker, DriftWindow};
pub use model::{Applicant, Classifier, LogisticModel, Prediction};
pub use server::AppState;
pub use validation::{validate, FieldSchema, FieldSpec, FieldType, ValidationError};
