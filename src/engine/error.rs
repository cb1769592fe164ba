//! Engine error taxonomy

use thiserror::Error;

/// Typed outcomes for every engine operation. No variant ever leaves the
/// session pointer advanced past a failed step.
#[derive(Debug, Error)]
pub enum TurnError {
    /// Empty or malformed caller input; surfaced for correction, not retried
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Session or question missing; fatal to the request
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The session is terminal; repeated calls never mutate state
    #[error("Interview is already complete")]
    SessionAlreadyComplete,

    /// A turn for this session is in flight; backpressure, retry later
    #[error("A turn for this session is already being processed")]
    TurnInProgress,

    /// Question generation failed or produced nothing usable
    #[error("Question generation failed: {0}")]
    GenerationFailed(String),

    /// Feedback generation failed; the user's answer is still recorded
    #[error("Feedback generation failed: {0}")]
    FeedbackGenerationFailed(String),

    /// Session store failure
    #[error("Session store error: {0}")]
    Store(String),
}
