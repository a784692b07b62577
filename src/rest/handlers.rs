use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::merge;
use crate::socials;
use crate::types::{CuratedEntry, FolioError};

use super::models::{
    ErrorResponse, HealthResponse, RefreshQuery, ResetQuery, StatusResponse, SummaryResponse,
};
use super::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let uptime_secs = state.started_at.elapsed().map(|d| d.as_secs()).unwrap_or(0);
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            uptime_secs,
        }),
    )
}

pub async fn get_projects(State(state): State<AppState>) -> Response {
    match merge::load_merged_view(state.store.as_ref()) {
        Ok(view) => Json(view).into_response(),
        Err(err) => {
            log::error!("Failed to read project data: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "failed to read project data".to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn save_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(entries): Json<BTreeMap<String, CuratedEntry>>,
) -> Response {
    if !is_authorized(&headers, &state.admin_token) {
        return unauthorized();
    }
    match state.sync.save_curated(&entries) {
        Ok(()) => Json(StatusResponse { success: true }).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RefreshQuery>,
) -> Response {
    if !is_authorized(&headers, &state.admin_token) {
        return unauthorized();
    }
    let outcome = match query.repo.as_deref() {
        Some(name) => state.sync.refresh_one(name).await,
        None => state.sync.refresh_all().await.map(|_| ()),
    };
    match outcome {
        Ok(()) => Json(StatusResponse { success: true }).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn regenerate(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !is_authorized(&headers, &state.admin_token) {
        return unauthorized();
    }
    match state.sync.regenerate_all().await {
        Ok(_) => Json(StatusResponse { success: true }).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn reset_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ResetQuery>,
) -> Response {
    if !is_authorized(&headers, &state.admin_token) {
        return unauthorized();
    }
    match state.sync.reset_summary(&query.repo).await {
        Ok(summary) => Json(SummaryResponse { summary }).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn get_socials(State(state): State<AppState>) -> Response {
    match socials::load(&state.data_dir) {
        Ok(links) => Json(links).into_response(),
        Err(err) => {
            log::error!("Failed to load social links: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "failed to load social links".to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not found".to_string(),
        }),
    )
}

fn is_authorized(headers: &HeaderMap, token: &Option<String>) -> bool {
    match token {
        None => true,
        Some(t) => {
            if let Some(v) = headers.get("x-api-key") {
                if v.to_str().ok() == Some(t.as_str()) {
                    return true;
                }
            }
            if let Some(v) = headers.get(axum::http::header::AUTHORIZATION) {
                if let Ok(s) = v.to_str() {
                    if let Some(rest) = s.strip_prefix("Bearer ") {
                        if rest == t {
                            return true;
                        }
                    }
                }
            }
            false
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "unauthorized".to_string(),
        }),
    )
        .into_response()
}

fn error_response(err: FolioError) -> Response {
    let status = match &err {
        FolioError::Upstream(..) | FolioError::UnexpectedShape(_) => StatusCode::BAD_GATEWAY,
        FolioError::MissingCredential(_) | FolioError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    log::error!("Request failed: {}", err);
    (status, Json(ErrorResponse { error: err.to_string() })).into_response()
}
