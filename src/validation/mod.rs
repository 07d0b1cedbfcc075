//! Request Schema Validation
//!
//! Gatekeeper for `/predict` payloads. Checks a decoded JSON object against a
//! declarative list of required, typed fields before anything reaches the model.
//!
//! Validation is first-failure-wins: fields are checked in declaration order and
//! the first violation is reported. Callers receive exactly one message per call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Primitive JSON types a field may be required to carry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    String,
}

impl FieldType {
    /// Whether a decoded JSON value satisfies this type.
    /// Floats (even `35.0`), booleans and integers beyond `i64` are not integers.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::Integer => value.is_i64(),
            FieldType::String => value.is_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => write!(f, "integer"),
            FieldType::String => write!(f, "string"),
        }
    }
}

/// Name of the JSON kind actually found in a payload
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() => "integer",
        Value::Number(n) if n.is_u64() => "integer out of range",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A named, typed requirement on the input mapping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered set of field requirements. Order decides which failure is reported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<FieldSpec>,
}

impl FieldSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// The seven applicant fields the hiring model is served with
    pub fn applicant() -> Self {
        Self::new(vec![
            FieldSpec::new("idade", FieldType::Integer),
            FieldSpec::new("tempo_experiencia", FieldType::Integer),
            FieldSpec::new("nivel_profissional", FieldType::String),
            FieldSpec::new("nivel_academico", FieldType::String),
            FieldSpec::new("nivel_ingles", FieldType::String),
            FieldSpec::new("nivel_espanhol", FieldType::String),
            FieldSpec::new("certificacoes", FieldType::Integer),
        ])
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate against this schema. See [`validate`].
    pub fn validate<'a>(&self, attributes: &'a Map<String, Value>) -> Result<&'a Map<String, Value>, ValidationError> {
        validate(attributes, self)
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::applicant()
    }
}

/// Why a payload was rejected. The `Display` text is the wire message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Campo ausente: {0}")]
    MissingField(String),
    #[error("Tipo inválido para '{field}'. Esperado {expected}, recebido {actual}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        actual: &'static str,
    },
}

impl ValidationError {
    /// Field the failure refers to
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField(name) => name,
            ValidationError::TypeMismatch { field, .. } => field,
        }
    }
}

/// Check `attributes` against `schema` in declaration order.
///
/// Returns the same mapping on success. Keys the schema does not name are
/// ignored; nothing is coerced, projected or reordered.
pub fn validate<'a>(
    attributes: &'a Map<String, Value>,
    schema: &FieldSchema,
) -> Result<&'a Map<String, Value>, ValidationError> {
    for spec in schema.fields() {
        let value = attributes
            .get(&spec.name)
            .ok_or_else(|| ValidationError::MissingField(spec.name.clone()))?;

        if !spec.field_type.matches(value) {
            return Err(ValidationError::TypeMismatch {
                field: spec.name.clone(),
                expected: spec.field_type,
                actual: json_kind(value),
            });
        }
    }

    Ok(attributes)
}
