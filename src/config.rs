//! Service configuration, read from the environment (and `.env` when present).

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::drift::{DEFAULT_BASELINE_MEAN, DEFAULT_CAPACITY};

pub const DEFAULT_THRESHOLD: f64 = 0.35;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    /// Port of the prediction API
    pub port: u16,
    /// Port of the separate `/metrics` listener
    pub metrics_port: u16,
    pub model_path: PathBuf,
    /// Decision threshold for the positive class
    pub threshold: f64,
    /// Mean positive-class probability observed on the training set
    pub baseline_mean: f64,
    pub drift_window: usize,
    pub log_dir: PathBuf,
    pub log_file: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            metrics_port: 8000,
            model_path: PathBuf::from("models/modelo_contratacao.json"),
            threshold: DEFAULT_THRESHOLD,
            baseline_mean: DEFAULT_BASELINE_MEAN,
            drift_window: DEFAULT_CAPACITY,
            log_dir: PathBuf::from("."),
            log_file: "api.log".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build from an explicit variable set; unset keys keep their defaults
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            host: vars.get("HIRING_HOST").cloned().unwrap_or(defaults.host),
            port: parse_var(&vars, "HIRING_PORT", defaults.port)?,
            metrics_port: parse_var(&vars, "HIRING_METRICS_PORT", defaults.metrics_port)?,
            model_path: vars
                .get("HIRING_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            threshold: parse_var(&vars, "HIRING_THRESHOLD", defaults.threshold)?,
            baseline_mean: parse_var(&vars, "HIRING_BASELINE_MEAN", defaults.baseline_mean)?,
            drift_window: parse_var(&vars, "HIRING_DRIFT_WINDOW", defaults.drift_window)?,
            log_dir: vars.get("HIRING_LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
            log_file: vars.get("HIRING_LOG_FILE").cloned().unwrap_or(defaults.log_file),
        };

        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            anyhow::bail!("HIRING_THRESHOLD must lie in [0, 1], got {}", self.threshold);
        }
        if !(0.0..=1.0).contains(&self.baseline_mean) {
            anyhow::bail!("HIRING_BASELINE_MEAN must lie in [0, 1], got {}", self.baseline_mean);
        }
        if self.drift_window == 0 {
            anyhow::bail!("HIRING_DRIFT_WINDOW must be positive");
        }
        Ok(())
    }

    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn metrics_addr(&self) -> String {
        format!("{}:{}", self.host, self.metrics_port)
    }
}

fn parse_var<T>(vars: &HashMap<String, String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match vars.get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}
