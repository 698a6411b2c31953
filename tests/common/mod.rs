#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use product_analyzer::analyzer::{Analyzer, AnalyzerOptions};
use product_analyzer::llm::{CompletionRequest, ModelClient, ModelError};

/// Product description of roughly 200 characters.
pub const DESCRIPTION: &str = "LockBeam is a solar-powered smart bike lock that sends a push alert to your phone the moment someone tampers with it, with a long two-year battery and a very loud siren for crowded and busy city streets.";

/// Model client that replays scripted replies and records every request.
#[derive(Default)]
pub struct FakeClient {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl FakeClient {
    pub fn replying(replies: Vec<Result<String, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    /// Waits `delay` before every reply.
    pub fn slow(delay: Duration, replies: Vec<Result<String, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelClient for FakeClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Other("no scripted reply left".to_string())))
    }
}

pub fn options(max_attempts: u32) -> AnalyzerOptions {
    AnalyzerOptions {
        model: "test/model".to_string(),
        max_output_tokens: 1024,
        max_attempts,
        retry_base_delay: Duration::from_millis(1),
    }
}

pub fn analyzer_with(client: &Arc<FakeClient>, max_attempts: u32) -> Analyzer {
    let client: Arc<dyn ModelClient> = client.clone();
    Analyzer::new(Some(client), options(max_attempts))
}

pub fn full_reply() -> Value {
    json!({
        "productName": "LockBeam",
        "oneLineSummary": "A solar smart bike lock with tamper alerts.",
        "marketPositioning": "Premium accessory for urban commuters.",
        "targetAudience": "City cyclists with expensive bikes.",
        "keyDifferentiators": ["Solar charging", "Instant phone alerts", "Built-in siren"],
        "trendAnalysis": "E-bike adoption is driving demand for better theft protection.",
        "growthPotential": "Strong, especially through bike-share partnerships.",
        "recommendations": ["Partner with insurers", "Launch a fleet edition"]
    })
}
