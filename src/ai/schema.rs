//! Wire formats of the question, review and summary services
//!
//! The services are loosely specified and have changed shape over time, so
//! parsing here is tolerant: questions may arrive in several layouts,
//! scores may be numbers or strings and are clamped into range, and list
//! fields default to empty. Anything that cannot yield a score is an error
//! for the caller to turn into a failure marker.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::submission::ReviewFeedback;

/// Inclusive score bounds of the review service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: u8,
    pub max: u8,
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self { min: 1, max: 10 }
    }
}

impl ScoreRange {
    pub fn clamp(&self, score: u8) -> u8 {
        score.clamp(self.min, self.max.max(self.min))
    }

    /// Read a score from a JSON number or numeric string
    pub fn score_from_value(&self, value: &Value) -> Option<u8> {
        let raw = match value {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };

        if !raw.is_finite() {
            return None;
        }

        let bounded = raw.round().clamp(f64::from(self.min), f64::from(self.max.max(self.min)));
        Some(bounded as u8)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewParseError {
    #[error("Review response is not JSON: {0}")]
    NotJson(String),

    #[error("Review response is not a JSON object")]
    NotAnObject,

    #[error("Review service reported an error: {0}")]
    ServiceError(String),

    #[error("Review response has no usable score")]
    MissingScore,
}

/// Parse a review body into feedback
pub fn parse_review(body: &str, range: ScoreRange) -> Result<ReviewFeedback, ReviewParseError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ReviewParseError::NotJson(e.to_string()))?;

    let object = value.as_object().ok_or(ReviewParseError::NotAnObject)?;

    if let Some(error) = object.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(ReviewParseError::ServiceError(message));
    }

    let score = object
        .get("score")
        .and_then(|v| range.score_from_value(v))
        .ok_or(ReviewParseError::MissingScore)?;

    let overall_feedback = object
        .get("overall_feedback")
        .or_else(|| object.get("overallFeedback"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let tips = object.get("tips").map(string_list).filter(|t| !t.is_empty());

    Ok(ReviewFeedback {
        score,
        strengths: object.get("strengths").map(string_list).unwrap_or_default(),
        weaknesses: object.get("weaknesses").map(string_list).unwrap_or_default(),
        overall_feedback,
        summary: object
            .get("summary")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        tips,
    })
}

/// Extract up to `count` questions from a generation response
///
/// Accepted layouts, in order:
/// 1. `{"questions": ["...", ...]}`
/// 2. `["...", ...]`
/// 3. `{"1": "...", "2": "..."}` ordered by numeric key
/// 4. any string values longer than 10 characters
pub fn parse_questions(value: &Value, count: usize) -> Vec<String> {
    let mut questions = match value {
        Value::Array(items) => strings_of(items.iter()),
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("questions") {
                strings_of(items.iter())
            } else {
                let mut numeric: Vec<(f64, &Value)> = map
                    .iter()
                    .filter_map(|(k, v)| k.trim().parse::<f64>().ok().map(|n| (n, v)))
                    .collect();
                numeric.sort_by(|a, b| a.0.total_cmp(&b.0));

                let ordered = strings_of(numeric.into_iter().map(|(_, v)| v));
                if ordered.is_empty() {
                    map.values()
                        .filter_map(Value::as_str)
                        .filter(|s| s.chars().count() > 10)
                        .map(str::to_string)
                        .collect()
                } else {
                    ordered
                }
            }
        }
        _ => Vec::new(),
    };

    questions.truncate(count);
    questions
}

fn strings_of<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<String> {
    values
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => strings_of(items.iter()),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Response of the optional summary service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub score: Option<f64>,
}
