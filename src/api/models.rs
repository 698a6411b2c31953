use serde::{Deserialize, Serialize};
use serde_json::Value;
use chrono::{DateTime, Utc};

use crate::analysis::AnalysisResult;

/// `input` stays untyped so non-text values reach validation instead of
/// failing JSON extraction.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub input: Option<Value>,
    #[serde(default, rename = "type")]
    pub input_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis: AnalysisResult,
    pub input_type: String,
    pub input_chars: usize,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub model_configured: bool,
}
