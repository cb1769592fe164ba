//! API request and response types

use crate::db::{Question, Response, Session};
use crate::engine::TurnOutcome;
use crate::transcript::TranscriptEntry;
use serde::{Deserialize, Serialize};

/// Request to start an interview session
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Opaque owner identifier; authentication lives outside this service
    pub user_id: String,
    pub topic: String,
}

/// Response for session start
#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session: Session,
    pub intro_message: String,
    pub questions: Vec<Question>,
}

/// Request to submit a finalized answer for the current question
#[derive(Debug, Deserialize)]
pub struct AdvanceTurnRequest {
    pub answer: String,
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Response for the turn endpoint
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AdvanceTurnResponse {
    /// A turn ran to completion
    Turn(TurnOutcome),
    /// The session was already terminal; informational, not an error
    AlreadyComplete { message: String, is_complete: bool },
}

impl AdvanceTurnResponse {
    pub fn already_complete() -> Self {
        Self::AlreadyComplete {
            message: "Interview is complete.".to_string(),
            is_complete: true,
        }
    }
}

/// Response with one session and everything recorded for it
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: Session,
    pub questions: Vec<Question>,
    pub responses: Vec<Response>,
    pub transcript: Vec<TranscriptEntry>,
    pub is_complete: bool,
}

/// Response with a user's sessions
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<Session>,
}

/// Response for the closing reflection
#[derive(Debug, Serialize)]
pub struct ReflectionResponse {
    pub reflection: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
