use axum::{
    Json,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::server::rate_limit::RateLimitDecision;
use crate::server::{AppState, create_error_response};
use crate::summarizer::{
    HealthReport, ProviderKind, ProviderStats, SummarizeOptions, SummarizerError, SummaryStyle,
};

pub const REQUESTER_HEADER: &str = "x-requester-id";
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";
const ANONYMOUS_REQUESTER: &str = "anonymous";

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub style: Option<String>,
    /// Enables caching when present
    #[serde(default)]
    pub note_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub provider: ProviderKind,
    pub word_count: usize,
    pub original_length: usize,
    pub summarized_at: DateTime<Utc>,
    pub cached: bool,
}

/// Health check endpoint - returns JSON status
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Summarize a note
///
/// Cache hits are answered before the rate limiter so they never consume
/// quota.
pub async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Response<Body> {
    let request_id = Uuid::new_v4();
    let requester = headers
        .get(REQUESTER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS_REQUESTER)
        .to_string();

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(%request_id, "Rejected summarize body: {}", rejection.body_text());
            return create_error_response(
                StatusCode::BAD_REQUEST,
                "invalid_request",
                &rejection.body_text(),
            );
        }
    };

    if let Some(note_id) = request.note_id.as_deref() {
        if let Some(mut cached) = state.cache.get(note_id, &request.text).await {
            tracing::debug!(%request_id, note_id, "Serving cached summary");
            cached.cached = true;
            return (StatusCode::OK, Json(cached)).into_response();
        }
    }

    if let RateLimitDecision::Limited { retry_after_secs } = state.rate_limiter.check(&requester)
    {
        tracing::warn!(%request_id, requester = %requester, "Rate limit exceeded");
        return create_error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            &format!("Too many summarization requests, retry in {retry_after_secs} seconds"),
        );
    }

    let style = match request.style.as_deref() {
        Some(style) => match style.parse::<SummaryStyle>() {
            Ok(style) => style,
            Err(e) => {
                return create_error_response(StatusCode::BAD_REQUEST, "invalid_input", &e.to_string());
            }
        },
        None => SummaryStyle::default(),
    };

    let mut options = SummarizeOptions::new()
        .with_style(style)
        .with_requester(requester.clone());
    if let Some(max_length) = request.max_length {
        options = options.with_max_length(max_length);
    }

    tracing::info!(%request_id, requester = %requester, "Summarize request");

    match state.summarizer.summarize(&request.text, &options).await {
        Ok(result) => {
            let response = SummarizeResponse {
                summary: result.summary,
                provider: result.provider,
                word_count: result.word_count,
                original_length: result.original_length,
                summarized_at: Utc::now(),
                cached: false,
            };

            if let Some(note_id) = request.note_id.as_deref() {
                state
                    .cache
                    .insert(note_id, &request.text, response.clone())
                    .await;
            }

            tracing::info!(%request_id, provider = %response.provider, "Summary produced");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(SummarizerError::InvalidInput(message)) => {
            create_error_response(StatusCode::BAD_REQUEST, "invalid_input", &message)
        }
        Err(e) => {
            tracing::error!(%request_id, "Summarization failed: {e}");
            create_error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "summarization_unavailable",
                &e.to_string(),
            )
        }
    }
}

pub async fn admin_stats_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response<Body> {
    if let Err(response) = authorize_admin(&state, &headers) {
        return response;
    }

    let stats: ProviderStats = state.summarizer.stats();
    (StatusCode::OK, Json(stats)).into_response()
}

pub async fn admin_health_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response<Body> {
    if let Err(response) = authorize_admin(&state, &headers) {
        return response;
    }

    let report: HealthReport = state.summarizer.health_check().await;
    (StatusCode::OK, Json(report)).into_response()
}

fn authorize_admin(state: &AppState, headers: &HeaderMap) -> Result<(), Response<Body>> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(create_error_response(
            StatusCode::FORBIDDEN,
            "admin_disabled",
            "Admin endpoints are disabled: no admin token configured",
        ));
    };

    let provided = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided != Some(expected) {
        tracing::warn!("Rejected admin request with missing or wrong token");
        return Err(create_error_response(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Missing or invalid admin token",
        ));
    }

    Ok(())
}
