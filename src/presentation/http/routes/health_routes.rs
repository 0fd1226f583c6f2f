use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use std::sync::Arc;

use crate::application::ports::CompletionProvider;
use crate::presentation::http::dto::{ApiResponse, HealthResponseDto, MessageResponseDto};

pub fn health_routes(completion_provider: Arc<dyn CompletionProvider>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .with_state(completion_provider)
}

async fn root_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(MessageResponseDto {
            message: "landed successfully".to_string(),
        }),
    )
}

async fn health_handler(
    State(completion_provider): State<Arc<dyn CompletionProvider>>,
) -> impl IntoResponse {
    let health_response = HealthResponseDto {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: completion_provider.model_info(),
    };

    (StatusCode::OK, Json(ApiResponse::success(health_response)))
}
