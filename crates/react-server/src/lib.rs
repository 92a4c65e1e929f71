//! HTTP API for react-agent-rs
//!
//! Exposes the reason+act loop and the arithmetic tools over JSON:
//!
//! | method | path             | purpose                              |
//! |--------|------------------|--------------------------------------|
//! | GET    | `/api/health`    | liveness                             |
//! | POST   | `/api/query`     | answer `{"query"}` through the loop  |
//! | POST   | `/api/sum`       | call `sum_two_numbers` directly      |
//! | POST   | `/api/multiply`  | call `multiply_two_numbers` directly |
//! | GET    | `/api/functions` | list tools and endpoints             |
//!
//! Built on Axum with permissive CORS and HTTP trace logging.

pub mod error;
mod handlers;

use axum::Router;
use axum::routing::{get, post};
use react_llm::LlmGateway;
use react_runtime::{LoopConfig, ReactLoop};
use react_utils::AppConfig;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;

/// Shared application state
pub struct AppState {
    /// The loop answering queries; its registry also serves the direct tool routes
    pub agent: Arc<ReactLoop>,
}

type SharedState = Arc<AppState>;

impl AppState {
    /// Wrap an already built loop
    pub fn new(agent: Arc<ReactLoop>) -> Self {
        Self { agent }
    }

    /// Build the loop from configuration with the built-in tools
    pub fn from_config(config: &AppConfig, gateway: Arc<dyn LlmGateway>) -> anyhow::Result<Self> {
        let loop_config = LoopConfig {
            max_iterations: config.max_iterations,
            model: config.model.clone(),
            gateway_timeout: config.gateway_timeout(),
            ..LoopConfig::default()
        };
        let registry = Arc::new(react_tools::default_registry()?);
        let agent = ReactLoop::new(gateway, registry, loop_config)?;
        Ok(Self::new(Arc::new(agent)))
    }
}

/// Build the Axum router with all API routes
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/query", post(handlers::query))
        .route("/api/sum", post(handlers::sum))
        .route("/api/multiply", post(handlers::multiply))
        .route("/api/functions", get(handlers::functions))
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until Ctrl-C
pub async fn start(state: Arc<AppState>, addr: &str) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use react_core::{ModelTurn, ToolCallRequest};
    use react_llm::scripted::ScriptedGateway;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(gateway: ScriptedGateway) -> Router {
        let config = AppConfig {
            max_iterations: 3,
            ..AppConfig::default()
        };
        let state = AppState::from_config(&config, Arc::new(gateway)).unwrap();
        build_router(Arc::new(state))
    }

    async fn send(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = send(app(ScriptedGateway::new()), "GET", "/api/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn query_runs_the_loop() {
        let gateway = ScriptedGateway::new()
            .then_turn(ModelTurn::tool_calls(vec![ToolCallRequest::new(
                "sum_two_numbers",
                json!({"x": 5, "y": 33}),
            )]))
            .then_turn(ModelTurn::text("5 + 33 = 38"));
        let (status, body) = send(
            app(gateway),
            "POST",
            "/api/query",
            r#"{"query": "How much is 5 + 33?"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"query": "How much is 5 + 33?", "result": "5 + 33 = 38", "status": "success"})
        );
    }

    #[tokio::test]
    async fn query_reports_exhaustion() {
        let gateway = ScriptedGateway::new().repeating(ModelTurn::tool_calls(vec![
            ToolCallRequest::new("sum_two_numbers", json!({"x": 1, "y": 1})),
        ]));
        let (status, body) = send(app(gateway), "POST", "/api/query", r#"{"query": "loop"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "exhausted");
        assert!(body["result"].as_str().unwrap().contains("Maximum iterations (3)"));
    }

    #[tokio::test]
    async fn query_validation() {
        let (status, body) = send(app(ScriptedGateway::new()), "POST", "/api/query", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing required field: query"}));

        let (status, body) = send(
            app(ScriptedGateway::new()),
            "POST",
            "/api/query",
            r#"{"query": "   "}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Query cannot be empty");

        let (status, _) = send(app(ScriptedGateway::new()), "POST", "/api/query", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn query_failure_is_internal_error() {
        let gateway = ScriptedGateway::new().then_turn(ModelTurn::tool_calls(vec![
            ToolCallRequest::new("divide_two_numbers", json!({"x": 1, "y": 0})),
        ]));
        let (status, body) = send(app(gateway), "POST", "/api/query", r#"{"query": "1/0"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Internal server error: "));
        assert!(message.contains("divide_two_numbers"));
    }

    #[tokio::test]
    async fn sum_and_multiply() {
        let (status, body) = send(
            app(ScriptedGateway::new()),
            "POST",
            "/api/sum",
            r#"{"x": 5, "y": 33}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"operation": "sum", "x": 5, "y": 33, "result": 38, "status": "success"})
        );

        let (status, body) = send(
            app(ScriptedGateway::new()),
            "POST",
            "/api/multiply",
            r#"{"x": 6.9, "y": 7}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["x"], json!(6.9));
        assert_eq!(body["result"], 42);
    }

    #[tokio::test]
    async fn arithmetic_validation() {
        let (status, body) = send(app(ScriptedGateway::new()), "POST", "/api/sum", r#"{"x": 1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: x and y");

        let (status, body) = send(
            app(ScriptedGateway::new()),
            "POST",
            "/api/multiply",
            r#"{"x": "6", "y": 7}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "x and y must be numbers"}));
    }

    #[tokio::test]
    async fn arithmetic_overflow_is_internal_error() {
        let body = format!(r#"{{"x": {}, "y": 1}}"#, i64::MAX);
        let (status, body) = send(app(ScriptedGateway::new()), "POST", "/api/sum", &body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("overflows"));
    }

    #[tokio::test]
    async fn functions_listing() {
        let (status, body) = send(app(ScriptedGateway::new()), "GET", "/api/functions", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["functions"][0]["name"], "sum_two_numbers");
        assert_eq!(body["functions"][1]["parameters"], json!(["x", "y"]));
        assert_eq!(body["endpoints"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = send(app(ScriptedGateway::new()), "GET", "/api/nope", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Endpoint not found", "status": "error"}));
    }
}
