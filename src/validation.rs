//! Request validation for the analyze operation.
//!
//! Trimming is only used to measure length; accepted text is handed on untrimmed.

use reqwest::Url;
use serde_json::Value;

use crate::error::ValidationError;

pub const MIN_INPUT_CHARS: usize = 50;

/// What the caller says `input` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Url,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Url => "url",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedInput<'a> {
    /// Product description, already length-checked.
    Text(&'a str),
    /// Product page to fetch; its extracted text is length-checked after the fetch.
    Url(Url),
}

impl ValidatedInput<'_> {
    pub fn kind(&self) -> InputKind {
        match self {
            ValidatedInput::Text(_) => InputKind::Text,
            ValidatedInput::Url(_) => InputKind::Url,
        }
    }
}

/// A missing claimed type means free text.
pub fn parse_kind(claimed: Option<&str>) -> Result<InputKind, ValidationError> {
    match claimed.map(str::trim) {
        None | Some("text") => Ok(InputKind::Text),
        Some("url") => Ok(InputKind::Url),
        Some(_) => Err(ValidationError::InvalidType),
    }
}

pub fn validate<'a>(
    input: Option<&'a Value>,
    claimed: Option<&str>,
) -> Result<ValidatedInput<'a>, ValidationError> {
    let kind = parse_kind(claimed)?;
    let text = match input {
        Some(Value::String(text)) => text.as_str(),
        _ => return Err(ValidationError::InvalidType),
    };

    match kind {
        InputKind::Text => {
            check_length(text)?;
            Ok(ValidatedInput::Text(text))
        }
        InputKind::Url => parse_url(text).map(ValidatedInput::Url),
    }
}

pub fn check_length(text: &str) -> Result<(), ValidationError> {
    let actual = text.trim().chars().count();
    if actual < MIN_INPUT_CHARS {
        return Err(ValidationError::TooShort { min: MIN_INPUT_CHARS, actual });
    }
    Ok(())
}

fn parse_url(text: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(text.trim()).map_err(|_| ValidationError::InvalidUrl)?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ValidationError::InvalidUrl),
    }
}
