//! HTTP calling layer for the summarizer
//!
//! A thin axum service in front of `Summarizer`:
//! - `POST /api/summarize` with per-requester rate limiting and a per-note cache
//! - `GET /admin/stats` and `GET /admin/health` behind an admin token
//! - `GET /health` liveness probe

pub mod cache;
pub mod handlers;
pub mod rate_limit;

use axum::{
    Router,
    body::Body,
    http::{StatusCode, Response},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{ServerConfig, credential_from_env};
use crate::error::{NotesumError, Result};
use crate::summarizer::Summarizer;

pub use cache::SummaryCache;
pub use handlers::{SummarizeRequest, SummarizeResponse};
pub use rate_limit::{RateLimitDecision, RateLimiter};

/// Headroom above the summarizer's worst case for the local fallback tiers
const FALLBACK_HEADROOM: Duration = Duration::from_secs(5);

/// Shared application state for all handlers
pub struct AppState {
    /// Summarization engine
    pub summarizer: Arc<Summarizer>,
    /// Per-requester quota
    pub rate_limiter: RateLimiter,
    /// Recent summaries by note id
    pub cache: SummaryCache,
    /// Expected `x-admin-token`; admin routes are disabled when `None`
    pub admin_token: Option<String>,
    /// Whole-request timeout
    pub request_timeout: Duration,
}

impl AppState {
    /// Build state from server configuration, reading the admin token from
    /// the environment variable it names
    pub fn new(config: &ServerConfig, summarizer: Arc<Summarizer>) -> Self {
        let request_timeout = request_timeout(config, &summarizer);
        Self {
            summarizer,
            rate_limiter: RateLimiter::new(&config.rate_limit),
            cache: SummaryCache::new(&config.cache),
            admin_token: credential_from_env(&config.admin_token_env),
            request_timeout,
        }
    }

    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token;
        self
    }
}

/// Whole-request timeout, never shorter than the time the summarizer needs
/// to exhaust its retries and reach the fallback engine
fn request_timeout(config: &ServerConfig, summarizer: &Summarizer) -> Duration {
    let configured = Duration::from_secs(config.timeout_secs);
    let required = summarizer
        .worst_case_latency()
        .saturating_add(FALLBACK_HEADROOM);

    if configured < required {
        tracing::warn!(
            "server.timeout_secs ({}s) is shorter than the summarizer's retry budget, using {:?}",
            config.timeout_secs,
            required
        );
        required
    } else {
        configured
    }
}

/// The summarization HTTP server
pub struct SummaryServer {
    config: ServerConfig,
    summarizer: Arc<Summarizer>,
}

impl SummaryServer {
    pub fn new(config: ServerConfig, summarizer: Arc<Summarizer>) -> Self {
        Self { config, summarizer }
    }

    /// Start the server and listen for requests until shutdown
    pub async fn serve(&self) -> Result<()> {
        let state = AppState::new(&self.config, self.summarizer.clone());
        let admin_enabled = state.admin_token.is_some();
        let app = create_router(Arc::new(state));

        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .map_err(|e| NotesumError::Config(format!("Invalid listen address: {e}")))?;

        tracing::info!("Starting summarization server on {addr}");
        tracing::info!(
            "Active provider: {}",
            self.summarizer.current_provider()
        );
        if admin_enabled {
            tracing::info!("Admin endpoints enabled");
        } else {
            tracing::info!(
                "Admin endpoints disabled (set {} to enable)",
                self.config.admin_token_env
            );
        }

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| NotesumError::Server(format!("Failed to bind to {addr}: {e}")))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| NotesumError::Server(format!("Server error: {e}")))?;

        tracing::info!("Summarization server shut down gracefully");
        Ok(())
    }
}

/// Create the router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = state.request_timeout;

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/summarize", post(handlers::summarize_handler))
        .route("/admin/stats", get(handlers::admin_stats_handler))
        .route("/admin/health", get(handlers::admin_health_handler))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create a JSON error response
pub(crate) fn create_error_response(
    status: StatusCode,
    error_type: &str,
    message: &str,
) -> Response<Body> {
    let body = serde_json::json!({
        "error": {
            "type": error_type,
            "message": message,
        }
    });

    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|_| {
            let mut fallback = Response::new(Body::empty());
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, RateLimitConfig, SummarizerConfig};
    use crate::summarizer::ProviderKind;
    use crate::testing::{MockProvider, test_summarizer_config};
    use axum::http::Request;
    use tower::ServiceExt;

    const NOTE: &str = "The launch review covered pricing and onboarding. Pricing stays the same for existing customers. The important change is a shorter onboarding flow for new teams.";

    fn test_state(provider: MockProvider, max_requests: usize) -> Arc<AppState> {
        let summarizer = Summarizer::with_provider(&test_summarizer_config(), Arc::new(provider));
        let config = ServerConfig {
            rate_limit: RateLimitConfig {
                max_requests,
                window_secs: 3600,
            },
            cache: CacheConfig::default(),
            ..ServerConfig::default()
        };
        Arc::new(
            AppState::new(&config, Arc::new(summarizer))
                .with_admin_token(Some("secret".to_string())),
        )
    }

    fn summarize_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/summarize")
            .header("content-type", "application/json")
            .header("x-requester-id", "user-1")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = test_state(MockProvider::succeeding(ProviderKind::Fallback, "unused"), 5);
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_summarize_success() {
        let state = test_state(
            MockProvider::succeeding(ProviderKind::OpenAi, "Pricing holds; onboarding gets shorter."),
            5,
        );
        let app = create_router(state);

        let response = app
            .oneshot(summarize_request(serde_json::json!({ "text": NOTE })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["summary"], "Pricing holds; onboarding gets shorter.");
        assert_eq!(json["provider"], "openai");
        assert_eq!(json["word_count"], 5);
        assert_eq!(json["cached"], false);
        assert!(json["summarized_at"].is_string());
    }

    #[tokio::test]
    async fn test_summarize_short_text_is_bad_request() {
        let state = test_state(MockProvider::succeeding(ProviderKind::OpenAi, "unused"), 5);
        let app = create_router(state);

        let response = app
            .oneshot(summarize_request(serde_json::json!({ "text": "Too short." })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["type"], "invalid_input");
    }

    #[tokio::test]
    async fn test_summarize_unknown_style_is_bad_request() {
        let state = test_state(MockProvider::succeeding(ProviderKind::OpenAi, "unused"), 5);
        let app = create_router(state);

        let response = app
            .oneshot(summarize_request(
                serde_json::json!({ "text": NOTE, "style": "haiku" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let state = test_state(MockProvider::succeeding(ProviderKind::OpenAi, "unused"), 5);
        let app = create_router(state);

        let request = Request::builder()
            .method("POST")
            .uri("/api/summarize")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["type"], "invalid_request");
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let state = test_state(
            MockProvider::succeeding(ProviderKind::OpenAi, "Pricing holds; onboarding gets shorter."),
            1,
        );
        let app = create_router(state);

        let first = app
            .clone()
            .oneshot(summarize_request(serde_json::json!({ "text": NOTE })))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(summarize_request(serde_json::json!({ "text": NOTE })))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_json(second).await["error"]["type"], "rate_limited");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_provider_and_quota() {
        let provider = Arc::new(MockProvider::succeeding(
            ProviderKind::OpenAi,
            "Pricing holds; onboarding gets shorter.",
        ));
        let summarizer = Summarizer::with_provider(&test_summarizer_config(), provider.clone());
        let config = ServerConfig {
            rate_limit: RateLimitConfig {
                max_requests: 1,
                window_secs: 3600,
            },
            ..ServerConfig::default()
        };
        let app = create_router(Arc::new(AppState::new(&config, Arc::new(summarizer))));
        let body = serde_json::json!({ "text": NOTE, "note_id": "note-42" });

        let first = app
            .clone()
            .oneshot(summarize_request(body.clone()))
            .await
            .unwrap();
        assert_eq!(body_json(first).await["cached"], false);

        let second = app.oneshot(summarize_request(body)).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(body_json(second).await["cached"], true);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_admin_requires_token() {
        let state = test_state(MockProvider::succeeding(ProviderKind::Fallback, "unused"), 5);
        let app = create_router(state);

        let missing = app
            .clone()
            .oneshot(Request::builder().uri("/admin/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let ok = app
            .oneshot(
                Request::builder()
                    .uri("/admin/stats")
                    .header("x-admin-token", "secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        let json = body_json(ok).await;
        assert_eq!(json["request_count"], 0);
        assert_eq!(json["current_provider"], "fallback");
    }

    #[tokio::test]
    async fn test_admin_disabled_without_token() {
        let summarizer = Summarizer::with_provider(
            &test_summarizer_config(),
            Arc::new(MockProvider::succeeding(ProviderKind::Fallback, "unused")),
        );
        let state = AppState::new(&ServerConfig::default(), Arc::new(summarizer))
            .with_admin_token(None);
        let app = create_router(Arc::new(state));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/health")
                    .header("x-admin-token", "anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["error"]["type"], "admin_disabled");
    }

    #[tokio::test]
    async fn test_admin_health_reports_provider() {
        let state = test_state(
            MockProvider::failing(
                ProviderKind::HuggingFace,
                crate::summarizer::SummarizerError::ProviderError("model loading".into()),
            ),
            5,
        );
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/health")
                    .header("x-admin-token", "secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["provider"], "huggingface");
    }

    #[test]
    fn test_request_timeout_covers_retry_budget() {
        let summarizer = Summarizer::with_provider(
            &SummarizerConfig::default(),
            Arc::new(MockProvider::succeeding(ProviderKind::OpenAi, "unused")),
        );

        let short = ServerConfig::default();
        assert_eq!(
            request_timeout(&short, &summarizer),
            Duration::from_secs(93) + FALLBACK_HEADROOM
        );

        let long = ServerConfig {
            timeout_secs: 300,
            ..ServerConfig::default()
        };
        assert_eq!(request_timeout(&long, &summarizer), Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_provider_still_reaches_fallback_over_http() {
        let provider = MockProvider::succeeding(ProviderKind::OpenAi, "never delivered")
            .with_delay(Duration::from_secs(3600));
        let summarizer = Summarizer::with_provider(&SummarizerConfig::default(), Arc::new(provider));
        let state = AppState::new(&ServerConfig::default(), Arc::new(summarizer));
        let app = create_router(Arc::new(state));

        let response = app
            .oneshot(summarize_request(serde_json::json!({ "text": NOTE })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["provider"], "fallback");
    }
}
