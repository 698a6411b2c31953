pub mod analysis;
pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod parser;
pub mod prompt;
pub mod scraper;
pub mod validation;

use std::sync::Arc;
use analyzer::Analyzer;
use config::Config;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let analyzer = Analyzer::from_config(&config);
        Self {
            config: Arc::new(config),
            analyzer: Arc::new(analyzer),
        }
    }
}
