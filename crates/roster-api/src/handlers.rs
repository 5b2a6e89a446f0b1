//! REST API handlers.
//!
//! Each handler reads/writes via `CandidateStore` and returns JSON
//! responses. "Not found" and "already exists" are store-level `false`
//! returns and map to 404/409 here.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use roster_core::Candidate;
use roster_store::StoreError;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

fn store_error_response(err: &StoreError) -> axum::response::Response {
    let status = match err {
        StoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        StoreError::Conflict(_) => StatusCode::CONFLICT,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    error_response(&err.to_string(), status).into_response()
}

/// Query parameters for listing/searching.
#[derive(serde::Deserialize)]
pub struct ListQuery {
    /// Substring to search for; omitted means list everything.
    pub q: Option<String>,
}

/// GET /api/v1/candidates
pub async fn list_candidates(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let result = match query.q.as_deref() {
        Some(term) => state.store.search(term),
        None => state.store.list_all(),
    };
    match result {
        Ok(candidates) => ApiResponse::ok(candidates).into_response(),
        Err(e) => store_error_response(&e),
    }
}

/// POST /api/v1/candidates
pub async fn add_candidate(
    State(state): State<ApiState>,
    Json(candidate): Json<Candidate>,
) -> impl IntoResponse {
    match state.store.add(&candidate) {
        Ok(true) => (StatusCode::CREATED, ApiResponse::ok(candidate)).into_response(),
        Ok(false) => {
            error_response("candidate already exists", StatusCode::CONFLICT).into_response()
        }
        Err(e) => store_error_response(&e),
    }
}

/// Fields that can be rewritten by an update; omitted fields keep their
/// stored values.
#[derive(serde::Deserialize)]
pub struct UpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub current_role: Option<String>,
    pub skills: Option<Vec<String>>,
    pub spoken_languages: Option<Vec<String>>,
}

/// PUT /api/v1/candidates/{email}
pub async fn update_candidate(
    State(state): State<ApiState>,
    Path(email): Path<String>,
    Json(req): Json<UpdateRequest>,
) -> impl IntoResponse {
    let result = state.store.update(&email, |candidate| {
        if let Some(first_name) = req.first_name {
            candidate.first_name = first_name;
        }
        if let Some(last_name) = req.last_name {
            candidate.last_name = last_name;
        }
        if let Some(current_role) = req.current_role {
            candidate.current_role = current_role;
        }
        if let Some(skills) = req.skills {
            candidate.skills = skills;
        }
        if let Some(spoken_languages) = req.spoken_languages {
            candidate.spoken_languages = spoken_languages;
        }
    });
    match result {
        Ok(true) => ApiResponse::ok("updated").into_response(),
        Ok(false) => error_response("candidate not found", StatusCode::NOT_FOUND).into_response(),
        Err(e) => store_error_response(&e),
    }
}

/// DELETE /api/v1/candidates/{email}
pub async fn remove_candidate(
    State(state): State<ApiState>,
    Path(email): Path<String>,
) -> impl IntoResponse {
    match state.store.remove(&email) {
        Ok(true) => ApiResponse::ok("removed").into_response(),
        Ok(false) => error_response("candidate not found", StatusCode::NOT_FOUND).into_response(),
        Err(e) => store_error_response(&e),
    }
}
