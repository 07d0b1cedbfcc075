//! Hiring Model
//!
//! Inference side of the hiring classifier. The model is trained offline
//! (one-hot encoded categorical features fed to a logistic regression) and
//! exported as a JSON artifact that this module loads and evaluates.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// Typed view of a validated `/predict` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Applicant {
    pub idade: i64,
    pub tempo_experiencia: i64,
    pub nivel_profissional: String,
    pub nivel_academico: String,
    pub nivel_ingles: String,
    pub nivel_espanhol: String,
    pub certificacoes: i64,
}

impl Applicant {
    /// Decode from an already validated attribute mapping
    pub fn from_attributes(attributes: &Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(attributes.clone()))
            .context("Failed to decode applicant attributes")
    }

    /// Value of a categorical feature by column name
    pub fn category(&self, feature: &str) -> Option<&str> {
        match feature {
            "nivel_profissional" => Some(&self.nivel_profissional),
            "nivel_academico" => Some(&self.nivel_academico),
            "nivel_ingles" => Some(&self.nivel_ingles),
            "nivel_espanhol" => Some(&self.nivel_espanhol),
            _ => None,
        }
    }

    /// Value of a numeric feature by column name
    pub fn numeric(&self, feature: &str) -> Option<f64> {
        match feature {
            "idade" => Some(self.idade as f64),
            "tempo_experiencia" => Some(self.tempo_experiencia as f64),
            "certificacoes" => Some(self.certificacoes as f64),
            _ => None,
        }
    }
}

/// Anything that can score an applicant with a positive-class probability
pub trait Classifier: Send + Sync {
    fn predict_proba(&self, applicant: &Applicant) -> Result<f64>;
}

/// Probability plus the thresholded class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub probability: f64,
    pub class: u8,
}

impl Prediction {
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        Self {
            probability,
            class: u8::from(probability >= threshold),
        }
    }
}

/// Logistic regression over one-hot encoded categories.
///
/// Categories missing from the artifact contribute nothing, which matches an
/// encoder trained to ignore unknown values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogisticModel {
    pub intercept: f64,
    #[serde(default)]
    pub categorical: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    pub numeric: HashMap<String, f64>,
}

impl LogisticModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact '{}'", path.display()))?;
        let model: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid model artifact '{}'", path.display()))?;
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> Result<()> {
        let weights = self
            .categorical
            .values()
            .flat_map(|c| c.values())
            .chain(self.numeric.values());
        if !self.intercept.is_finite() || weights.into_iter().any(|w| !w.is_finite()) {
            anyhow::bail!("Model artifact contains non-finite weights");
        }
        Ok(())
    }

    /// Linear term before the sigmoid
    pub fn logit(&self, applicant: &Applicant) -> Result<f64> {
        let mut z = self.intercept;

        for (feature, weights) in &self.categorical {
            let category = applicant
                .category(feature)
                .with_context(|| format!("Unknown categorical feature '{}'", feature))?;
            z += weights.get(category).copied().unwrap_or(0.0);
        }

        for (feature, weight) in &self.numeric {
            let value = applicant
                .numeric(feature)
                .with_context(|| format!("Unknown numeric feature '{}'", feature))?;
            z += weight * value;
        }

        Ok(z)
    }
}

impl Classifier for LogisticModel {
    fn predict_proba(&self, applicant: &Applicant) -> Result<f64> {
        Ok(sigmoid(self.logit(applicant)?))
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
