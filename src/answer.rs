//! Answer payload returned for every question.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One result row: column name -> JSON value
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerTable {
    pub title: String,
    pub rows: Vec<Row>,
}

impl AnswerTable {
    pub fn new(title: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            title: title.into(),
            rows,
        }
    }
}

/// Provenance record for a dataset behind an answer's figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub dataset_id: String,
    pub title: String,
    pub catalog_url: String,
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub answer_text: String,
    pub tables: Vec<AnswerTable>,
    pub citations: Vec<Citation>,
}

impl AnswerPayload {
    pub fn new(answer_text: impl Into<String>, tables: Vec<AnswerTable>, citations: Vec<Citation>) -> Self {
        Self {
            answer_text: answer_text.into(),
            tables,
            citations,
        }
    }

    /// Narrative-only answer used when nothing usable was found
    pub fn text_only(answer_text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self::new(answer_text, Vec::new(), citations)
    }

    /// Degraded answer for a fault that escaped the planner
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::new(format!("Error: {}", message), Vec::new(), Vec::new())
    }
}

/// Build a row from `(column, value)` pairs
pub fn row<I, K>(pairs: I) -> Row
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// JSON number for a float, `null` when missing or not finite
pub fn number(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Round to two decimals, as rainfall averages are reported
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
