use axum::Router;
use axum::extract::DefaultBodyLimit;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::application::ports::CompletionProvider;
use crate::presentation::http::{
    handlers::{AskHandler, DocumentHandler},
    routes::{ask_routes, document_routes, health_routes},
};

/// Assembles the routes and middleware; split out of [`HttpServer::run`] so
/// the full stack can be driven in tests.
pub fn build_router(
    document_handler: Arc<DocumentHandler>,
    ask_handler: Arc<AskHandler>,
    completion_provider: Arc<dyn CompletionProvider>,
    max_upload_bytes: usize,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health_routes(completion_provider))
        .merge(document_routes(document_handler))
        .merge(ask_routes(ask_handler))
        .layer(cors)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(
            TraceLayer::new_for_http()
                .on_request(
                    |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                        tracing::info!("Received request: {} {}", request.method(), request.uri());
                    },
                )
                .on_response(
                    |response: &axum::http::Response<axum::body::Body>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            "Response: {} (took {} ms)",
                            response.status(),
                            latency.as_millis()
                        );
                    },
                )
                .on_failure(
                    |error: ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::error!(
                            "Request failed: {:?} (took {} ms)",
                            error,
                            latency.as_millis()
                        );
                    },
                ),
        )
}

pub struct HttpServer {
    document_handler: Arc<DocumentHandler>,
    ask_handler: Arc<AskHandler>,
    completion_provider: Arc<dyn CompletionProvider>,
    addr: SocketAddr,
    max_upload_bytes: usize,
}

impl HttpServer {
    pub fn new(
        document_handler: Arc<DocumentHandler>,
        ask_handler: Arc<AskHandler>,
        completion_provider: Arc<dyn CompletionProvider>,
        addr: SocketAddr,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            document_handler,
            ask_handler,
            completion_provider,
            addr,
            max_upload_bytes,
        }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = build_router(
            self.document_handler,
            self.ask_handler,
            self.completion_provider,
            self.max_upload_bytes,
        );

        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("Server listening on {}", self.addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
