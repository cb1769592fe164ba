//! HTTP request handlers

use super::types::{
    AdvanceTurnRequest, AdvanceTurnResponse, ErrorResponse, ReflectionResponse,
    SessionListResponse, SessionResponse, StartSessionRequest, StartSessionResponse,
};
use super::AppState;
use crate::engine::TurnError;
use crate::prompts;
use crate::transcript::Transcript;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session creation and listing
        .route("/api/sessions", post(start_session).get(list_sessions))
        // Session retrieval with assembled transcript
        .route("/api/sessions/:id", get(get_session))
        // Turn progression
        .route("/api/sessions/:id/turn", post(advance_turn))
        .route("/api/sessions/:id/feedback/retry", post(retry_feedback))
        // Closing reflection
        .route("/api/sessions/:id/reflection", post(reflect))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session Creation and Listing
// ============================================================

async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, AppError> {
    if req.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("user_id is required".to_string()));
    }

    let start = state.engine.start_session(&req.user_id, &req.topic).await?;

    Ok(Json(StartSessionResponse {
        session: start.session,
        intro_message: start.intro_message,
        questions: start.questions,
    }))
}

#[derive(Debug, Deserialize)]
struct ListSessionsQuery {
    user_id: String,
}

async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<ListSessionsQuery>,
) -> Result<Json<SessionListResponse>, AppError> {
    let sessions = state
        .db
        .list_sessions(&query.user_id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(SessionListResponse { sessions }))
}

// ============================================================
// Session Retrieval
// ============================================================

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .db
        .get_session(&id)
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    let questions = state
        .db
        .get_questions(&id)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let responses = state
        .db
        .get_responses(&id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let transcript = Transcript::from_session(
        &prompts::intro_message(&session.topic),
        &questions,
        &responses,
    );
    let is_complete = session.is_complete(questions.len());

    Ok(Json(SessionResponse {
        session,
        questions,
        responses,
        transcript: transcript.render(),
        is_complete,
    }))
}

// ============================================================
// Turn Progression
// ============================================================

async fn advance_turn(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AdvanceTurnRequest>,
) -> Result<Json<AdvanceTurnResponse>, AppError> {
    match state
        .engine
        .advance_turn(&id, &req.answer, req.audio_url.as_deref())
        .await
    {
        Ok(outcome) => Ok(Json(AdvanceTurnResponse::Turn(outcome))),
        // Terminal sessions answer informationally, matching what the user
        // sees: the interview simply ended.
        Err(TurnError::SessionAlreadyComplete) => {
            Ok(Json(AdvanceTurnResponse::already_complete()))
        }
        Err(e) => Err(e.into()),
    }
}

async fn retry_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AdvanceTurnResponse>, AppError> {
    match state.engine.retry_feedback(&id).await {
        Ok(outcome) => Ok(Json(AdvanceTurnResponse::Turn(outcome))),
        Err(TurnError::SessionAlreadyComplete) => {
            Ok(Json(AdvanceTurnResponse::already_complete()))
        }
        Err(e) => Err(e.into()),
    }
}

// ============================================================
// Reflection
// ============================================================

async fn reflect(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReflectionResponse>, AppError> {
    let reflection = state.engine.reflect(&id).await?;
    Ok(Json(ReflectionResponse { reflection }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================
// Error Handling
// ============================================================

/// Application error type for handlers
#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    UpstreamFailed(String),
    Internal(String),
}

impl From<TurnError> for AppError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::InvalidInput(msg) => AppError::BadRequest(msg),
            TurnError::NotFound(id) => AppError::NotFound(format!("Session not found: {id}")),
            TurnError::TurnInProgress | TurnError::SessionAlreadyComplete => {
                AppError::Conflict(err.to_string())
            }
            TurnError::GenerationFailed(_) | TurnError::FeedbackGenerationFailed(_) => {
                AppError::UpstreamFailed(err.to_string())
            }
            TurnError::Store(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::UpstreamFailed(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
