//! Request handlers and the JSON error shape shared by every route

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::{openapi, AppState};
use crate::flashcards::{CreatedFlashcard, NewFlashcard, ServiceError};

/// Error returned by handlers, rendered as `{"message": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::MissingFields => Self::new(StatusCode::BAD_REQUEST, "Missing required fields"),
            ServiceError::MissingStudentId => Self::new(StatusCode::BAD_REQUEST, "Missing student_id"),
            ServiceError::InvalidLimit(_) => Self::new(StatusCode::BAD_REQUEST, "Invalid limit"),
            ServiceError::Storage(e) => {
                log::error!("Flashcard storage failure: {}", e);
                Self::server_error()
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        log::error!("Flashcard task failed: {}", err);
        Self::server_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Query parameters for mixed-subject retrieval
#[derive(Debug, Deserialize)]
pub struct MixQuery {
    pub student_id: Option<String>,
    /// Kept as text so a non-numeric limit is reported, not rejected by the extractor
    pub limit: Option<String>,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "message": "Server is healthy" }))
}

pub async fn api_docs() -> Json<serde_json::Value> {
    Json(openapi::document())
}

pub async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not Found")
}

/// Add a new flashcard with subject inference
pub async fn create_flashcard(
    State(state): State<AppState>,
    body: Result<Json<NewFlashcard>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = body.map_err(|rejection| {
        log::error!("Rejected flashcard body: {}", rejection.body_text());
        ApiError::new(StatusCode::BAD_REQUEST, "Invalid request body")
    })?;

    let service = state.service.clone();
    let created = tokio::task::spawn_blocking(move || service.add_flashcard(request)).await??;

    state.cache.invalidate_student(&created.student_id);

    Ok(Json(CreatedFlashcard::new(created.subject)).into_response())
}

/// Get mixed subject flashcards for a student
pub async fn get_mixed_flashcards(
    State(state): State<AppState>,
    query: Result<Query<MixQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|rejection| {
        log::error!("Rejected flashcard query: {}", rejection.body_text());
        ApiError::new(StatusCode::BAD_REQUEST, "Invalid query string")
    })?;
    let student_id = match query.student_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            log::error!("Missing student_id in flashcard retrieval");
            return Err(ServiceError::MissingStudentId.into());
        }
    };
    let limit = state.limits.resolve(query.limit.as_deref())?;

    let generation = state.cache.generation(&student_id);
    if let Some((cards, remaining)) = state.cache.get(&student_id, limit) {
        log::debug!("Serving cached flashcards for {} (limit {})", student_id, limit);
        return Ok(with_max_age(Json(cards).into_response(), remaining.as_secs()));
    }

    let service = state.service.clone();
    let lookup_id = student_id.clone();
    let cards = tokio::task::spawn_blocking(move || {
        service.mixed_flashcards(Some(&lookup_id), limit, &mut rand::thread_rng())
    })
    .await??;

    state.cache.insert(student_id, limit, generation, cards.clone());
    Ok(with_max_age(Json(cards).into_response(), state.cache.ttl().as_secs()))
}

fn with_max_age(mut response: Response, seconds: u64) -> Response {
    if let Ok(value) = HeaderValue::from_str(&format!("max-age={}", seconds)) {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }
    response
}
