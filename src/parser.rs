use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::analysis::AnalysisResult;
use crate::error::{AppError, Result};

// A reply wrapped in a single ```json ... ``` (or bare ```) block.
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A```(?:json)?[ \t]*\r?\n?(.*?)\r?\n?```\z").expect("Failed to compile fence pattern")
});

/// Removes a surrounding code fence, if any, and surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    match FENCED_BLOCK.captures(trimmed).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Decodes a raw model reply and enforces the response contract.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| AppError::MalformedResponse(format!("reply is not valid JSON: {}", e)))?;

    check_contract(&value)?;

    serde_json::from_value(value)
        .map_err(|e| AppError::ContractViolation(format!("field has the wrong type: {}", e)))
}

fn check_contract(value: &Value) -> Result<()> {
    let object = value
        .as_object()
        .ok_or_else(|| AppError::ContractViolation("reply is not a JSON object".to_string()))?;

    for field in ["productName", "oneLineSummary"] {
        let present = object
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty());
        if !present {
            return Err(AppError::ContractViolation(format!("{} is missing or empty", field)));
        }
    }

    if !object.get("keyDifferentiators").is_some_and(Value::is_array) {
        return Err(AppError::ContractViolation(
            "keyDifferentiators is missing or not a list".to_string(),
        ));
    }

    Ok(())
}
