//! Trait abstractions for the engine's collaborators
//!
//! The session store and the two generators are external collaborators; the
//! traits here are the seams that let the turn controller be exercised with
//! mock implementations.

use crate::db::{Database, Question, Response, Session};
use crate::generator::{FeedbackGenerator, QuestionGenerator};
use crate::llm::LlmError;
use async_trait::async_trait;
use std::sync::Arc;

/// A session together with its ordered question list
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session: Session,
    pub questions: Vec<Question>,
}

impl SessionSnapshot {
    /// The pointer as an index into `questions`
    pub fn current_index(&self) -> usize {
        usize::try_from(self.session.current_question_index).unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.session.is_complete(self.questions.len())
    }
}

/// Durable storage for sessions, questions, and recorded turns
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, user_id: &str, topic: &str) -> Result<Session, String>;

    /// Load a session with its question list. `None` when the id does not
    /// resolve.
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionSnapshot>, String>;

    async fn create_questions(
        &self,
        session_id: &str,
        texts: &[String],
    ) -> Result<Vec<Question>, String>;

    /// Record a user answer against a question; the reply is attached later
    async fn create_response(
        &self,
        session_id: &str,
        question_id: &str,
        answer: &str,
        audio_url: Option<&str>,
    ) -> Result<Response, String>;

    async fn attach_reply(&self, response_id: &str, reply: &str) -> Result<(), String>;

    async fn update_pointer(&self, session_id: &str, new_index: i64) -> Result<(), String>;

    /// The most recent answer to a question still awaiting its reply
    async fn open_response(
        &self,
        session_id: &str,
        question_id: &str,
    ) -> Result<Option<Response>, String>;

    async fn list_responses(&self, session_id: &str) -> Result<Vec<Response>, String>;
}

/// Produces the ordered question list for a topic
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// May return an empty list; the engine treats that as a generation
    /// failure.
    async fn generate_questions(&self, topic: &str) -> Result<Vec<String>, LlmError>;
}

/// Produces conversational replies and the closing reflection
#[async_trait]
pub trait FeedbackSource: Send + Sync {
    async fn generate_reply(&self, question: &str, answer: &str) -> Result<String, LlmError>;

    async fn generate_reflection(&self, conversation: &str) -> Result<String, LlmError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn create_session(&self, user_id: &str, topic: &str) -> Result<Session, String> {
        (**self).create_session(user_id, topic).await
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<SessionSnapshot>, String> {
        (**self).get_session(session_id).await
    }

    async fn create_questions(
        &self,
        session_id: &str,
        texts: &[String],
    ) -> Result<Vec<Question>, String> {
        (**self).create_questions(session_id, texts).await
    }

    async fn create_response(
        &self,
        session_id: &str,
        question_id: &str,
        answer: &str,
        audio_url: Option<&str>,
    ) -> Result<Response, String> {
        (**self)
            .create_response(session_id, question_id, answer, audio_url)
            .await
    }

    async fn attach_reply(&self, response_id: &str, reply: &str) -> Result<(), String> {
        (**self).attach_reply(response_id, reply).await
    }

    async fn update_pointer(&self, session_id: &str, new_index: i64) -> Result<(), String> {
        (**self).update_pointer(session_id, new_index).await
    }

    async fn open_response(
        &self,
        session_id: &str,
        question_id: &str,
    ) -> Result<Option<Response>, String> {
        (**self).open_response(session_id, question_id).await
    }

    async fn list_responses(&self, session_id: &str) -> Result<Vec<Response>, String> {
        (**self).list_responses(session_id).await
    }
}

#[async_trait]
impl<T: QuestionSource + ?Sized> QuestionSource for Arc<T> {
    async fn generate_questions(&self, topic: &str) -> Result<Vec<String>, LlmError> {
        (**self).generate_questions(topic).await
    }
}

#[async_trait]
impl<T: FeedbackSource + ?Sized> FeedbackSource for Arc<T> {
    async fn generate_reply(&self, question: &str, answer: &str) -> Result<String, LlmError> {
        (**self).generate_reply(question, answer).await
    }

    async fn generate_reflection(&self, conversation: &str) -> Result<String, LlmError> {
        (**self).generate_reflection(conversation).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as the session store
#[derive(Clone)]
pub struct DatabaseStore {
    db: Database,
}

impl DatabaseStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for DatabaseStore {
    async fn create_session(&self, user_id: &str, topic: &str) -> Result<Session, String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.db
            .create_session(&id, user_id, topic)
            .map_err(|e| e.to_string())
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<SessionSnapshot>, String> {
        let session = match self.db.get_session(session_id) {
            Ok(session) => session,
            Err(crate::db::DbError::SessionNotFound(_)) => return Ok(None),
            Err(e) => return Err(e.to_string()),
        };
        let questions = self.db.get_questions(session_id).map_err(|e| e.to_string())?;
        Ok(Some(SessionSnapshot { session, questions }))
    }

    async fn create_questions(
        &self,
        session_id: &str,
        texts: &[String],
    ) -> Result<Vec<Question>, String> {
        self.db
            .create_questions(session_id, texts)
            .map_err(|e| e.to_string())
    }

    async fn create_response(
        &self,
        session_id: &str,
        question_id: &str,
        answer: &str,
        audio_url: Option<&str>,
    ) -> Result<Response, String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.db
            .create_response(&id, session_id, question_id, answer, audio_url)
            .map_err(|e| e.to_string())
    }

    async fn attach_reply(&self, response_id: &str, reply: &str) -> Result<(), String> {
        self.db
            .attach_reply(response_id, reply)
            .map_err(|e| e.to_string())
    }

    async fn update_pointer(&self, session_id: &str, new_index: i64) -> Result<(), String> {
        self.db
            .update_session_pointer(session_id, new_index)
            .map_err(|e| e.to_string())
    }

    async fn open_response(
        &self,
        session_id: &str,
        question_id: &str,
    ) -> Result<Option<Response>, String> {
        self.db
            .open_response(session_id, question_id)
            .map_err(|e| e.to_string())
    }

    async fn list_responses(&self, session_id: &str) -> Result<Vec<Response>, String> {
        self.db.get_responses(session_id).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl QuestionSource for QuestionGenerator {
    async fn generate_questions(&self, topic: &str) -> Result<Vec<String>, LlmError> {
        self.generate(topic).await
    }
}

#[async_trait]
impl FeedbackSource for FeedbackGenerator {
    async fn generate_reply(&self, question: &str, answer: &str) -> Result<String, LlmError> {
        self.reply(question, answer).await
    }

    async fn generate_reflection(&self, conversation: &str) -> Result<String, LlmError> {
        self.reflection(conversation).await
    }
}
