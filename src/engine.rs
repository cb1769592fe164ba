//! Interview session progression engine
//!
//! Owns the authoritative state of an in-progress interview: which question
//! is current, what has been answered, and when the session is complete. The
//! turn controller coordinates turn-taking between user input and generated
//! content; the submission guard keeps concurrent submissions for the same
//! session from racing the pointer.

mod error;
mod guard;
mod traits;
mod turn;

#[cfg(test)]
pub mod testing;

#[cfg(test)]
mod proptests;

pub use error::TurnError;
pub use guard::SubmissionGuard;
pub use traits::{
    DatabaseStore, FeedbackSource, QuestionSource, SessionSnapshot, SessionStore,
};
pub use turn::{SessionStart, TurnEngine, TurnOutcome};

use crate::generator::{FeedbackGenerator, QuestionGenerator};

/// Type alias for the production engine with concrete implementations
pub type ProductionEngine = TurnEngine<DatabaseStore, QuestionGenerator, FeedbackGenerator>;
