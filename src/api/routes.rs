use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use chrono::Utc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::analyzer::Analysis;
use crate::error::AppError;
use crate::api::models::{AnalyzeRequest, AnalyzeResponse, HealthResponse};
use crate::api::response;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/api/analyze/markdown", post(markdown_handler))
        .route("/api/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Response {
    match process_analyze_request(&state, &req).await {
        Ok(analysis) => response::success(AnalyzeResponse {
            input_type: analysis.input_kind.as_str().to_string(),
            input_chars: analysis.input_chars,
            analysis: analysis.result,
            analyzed_at: Utc::now(),
        })
        .into_response(),
        Err(res) => res,
    }
}

async fn markdown_handler(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Response {
    match process_analyze_request(&state, &req).await {
        Ok(analysis) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            analysis.result.to_markdown(),
        )
            .into_response(),
        Err(res) => res,
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    response::success(HealthResponse {
        status: "ok".to_string(),
        model_configured: state.analyzer.is_configured(),
    })
}

/// Runs the analysis under the request deadline. Failures come back as
/// ready-to-send error envelopes.
async fn process_analyze_request(state: &AppState, req: &AnalyzeRequest) -> Result<Analysis, Response> {
    info!(input_type = ?req.input_type, "Processing analyze request");
    let start_time = Instant::now();

    // Set an overall timeout for the entire handler
    let result = tokio::time::timeout(
        state.config.request_timeout,
        state.analyzer.analyze(req.input.as_ref(), req.input_type.as_deref()),
    )
    .await;

    let elapsed = start_time.elapsed();
    info!("Request processing took: {:?}", elapsed);

    match result {
        Ok(Ok(analysis)) => {
            info!(product = %analysis.result.product_name, "Analysis completed");
            Ok(analysis)
        }
        Ok(Err(err)) => {
            match &err {
                AppError::Configuration(detail) | AppError::Upstream(detail) => {
                    error!(code = err.code(), "{}", detail)
                }
                AppError::Validation(reason) => info!(code = err.code(), "Rejected input: {}", reason),
                _ => warn!(code = err.code(), "{}", err),
            }
            Err(err.into_response())
        }
        Err(_) => {
            warn!("Request timed out after {:?}", elapsed);
            Err(response::error::<()>(
                StatusCode::REQUEST_TIMEOUT,
                "timeout",
                "Request processing timed out".to_string(),
            )
            .into_response())
        }
    }
}
