//! Turn controller
//!
//! The state machine that decides whether a session accepts an answer,
//! advances the current-question pointer, and computes the next prompt to
//! surface. Completion is always recomputed from the pointer against the
//! question count; it is never stored separately.

use super::error::TurnError;
use super::guard::SubmissionGuard;
use super::traits::{FeedbackSource, QuestionSource, SessionSnapshot, SessionStore};
use crate::db::{Question, Session};
use crate::prompts;
use crate::transcript::Transcript;
use serde::Serialize;

/// Result of starting a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStart {
    pub session: Session,
    pub intro_message: String,
    pub questions: Vec<Question>,
}

/// Result of one completed turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub question_asked: String,
    pub user_answer: String,
    pub ai_reply: String,
    pub next_question: Option<String>,
    pub is_complete: bool,
}

/// Generic turn controller over the store and generator seams
pub struct TurnEngine<S, Q, F>
where
    S: SessionStore,
    Q: QuestionSource,
    F: FeedbackSource,
{
    store: S,
    questions: Q,
    feedback: F,
    guard: SubmissionGuard,
}

impl<S, Q, F> TurnEngine<S, Q, F>
where
    S: SessionStore,
    Q: QuestionSource,
    F: FeedbackSource,
{
    pub fn new(store: S, questions: Q, feedback: F) -> Self {
        Self {
            store,
            questions,
            feedback,
            guard: SubmissionGuard::new(),
        }
    }

    /// Start a session: persist it, generate and persist the question list,
    /// and return the opening context.
    pub async fn start_session(
        &self,
        user_id: &str,
        topic: &str,
    ) -> Result<SessionStart, TurnError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(TurnError::InvalidInput(
                "topic must not be empty".to_string(),
            ));
        }

        let session = self
            .store
            .create_session(user_id, topic)
            .await
            .map_err(TurnError::Store)?;

        let texts = self
            .questions
            .generate_questions(topic)
            .await
            .map_err(|e| TurnError::GenerationFailed(e.to_string()))?;
        if texts.is_empty() {
            return Err(TurnError::GenerationFailed(
                "generator returned no questions".to_string(),
            ));
        }

        let questions = self
            .store
            .create_questions(&session.id, &texts)
            .await
            .map_err(TurnError::Store)?;

        tracing::info!(
            session_id = %session.id,
            topic = %topic,
            question_count = questions.len(),
            "Interview session started"
        );

        Ok(SessionStart {
            intro_message: prompts::intro_message(topic),
            session,
            questions,
        })
    }

    /// Accept a finalized answer for the session's current question and run
    /// the turn to completion: persist the answer, generate and persist the
    /// paired reply, advance the pointer, and report what comes next.
    pub async fn advance_turn(
        &self,
        session_id: &str,
        answer_text: &str,
        audio_url: Option<&str>,
    ) -> Result<TurnOutcome, TurnError> {
        let answer = answer_text.trim();
        if answer.is_empty() {
            return Err(TurnError::InvalidInput(
                "answer must not be empty".to_string(),
            ));
        }

        let _permit = self
            .guard
            .try_acquire(session_id)
            .ok_or(TurnError::TurnInProgress)?;

        let snapshot = self.load(session_id).await?;
        if snapshot.is_complete() {
            return Err(TurnError::SessionAlreadyComplete);
        }

        let index = snapshot.current_index();
        let current = &snapshot.questions[index];

        // The answer is durable from here on, even if generation fails below.
        let response = self
            .store
            .create_response(session_id, &current.id, answer, audio_url)
            .await
            .map_err(TurnError::Store)?;

        let reply = self.generate_reply(&current.text, answer, session_id).await?;

        self.store
            .attach_reply(&response.id, &reply)
            .await
            .map_err(TurnError::Store)?;

        self.finish_turn(&snapshot, answer, reply).await
    }

    /// Re-run feedback generation for a turn whose answer was recorded but
    /// whose reply failed to generate, then advance the pointer as usual.
    pub async fn retry_feedback(&self, session_id: &str) -> Result<TurnOutcome, TurnError> {
        let _permit = self
            .guard
            .try_acquire(session_id)
            .ok_or(TurnError::TurnInProgress)?;

        let snapshot = self.load(session_id).await?;
        if snapshot.is_complete() {
            return Err(TurnError::SessionAlreadyComplete);
        }

        let index = snapshot.current_index();
        let current = &snapshot.questions[index];

        let open = self
            .store
            .open_response(session_id, &current.id)
            .await
            .map_err(TurnError::Store)?
            .ok_or_else(|| {
                TurnError::InvalidInput(
                    "no recorded answer is awaiting feedback for this question".to_string(),
                )
            })?;

        let reply = self
            .generate_reply(&current.text, &open.user_answer, session_id)
            .await?;

        self.store
            .attach_reply(&open.id, &reply)
            .await
            .map_err(TurnError::Store)?;

        self.finish_turn(&snapshot, &open.user_answer, reply).await
    }

    /// Closing reflection over the finalized conversation. Read-only.
    pub async fn reflect(&self, session_id: &str) -> Result<String, TurnError> {
        let snapshot = self.load(session_id).await?;
        let responses = self
            .store
            .list_responses(session_id)
            .await
            .map_err(TurnError::Store)?;

        let transcript = Transcript::from_session(
            &prompts::intro_message(&snapshot.session.topic),
            &snapshot.questions,
            &responses,
        );

        let reflection = self
            .feedback
            .generate_reflection(&transcript.as_conversation_text())
            .await
            .map_err(|e| TurnError::FeedbackGenerationFailed(e.to_string()))?;
        if reflection.trim().is_empty() {
            return Err(TurnError::FeedbackGenerationFailed(
                "generator returned an empty reflection".to_string(),
            ));
        }

        Ok(reflection)
    }

    async fn load(&self, session_id: &str) -> Result<SessionSnapshot, TurnError> {
        self.store
            .get_session(session_id)
            .await
            .map_err(TurnError::Store)?
            .ok_or_else(|| TurnError::NotFound(session_id.to_string()))
    }

    async fn generate_reply(
        &self,
        question: &str,
        answer: &str,
        session_id: &str,
    ) -> Result<String, TurnError> {
        match self.feedback.generate_reply(question, answer).await {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) => {
                tracing::warn!(session_id = %session_id, "Feedback generator returned empty reply");
                Err(TurnError::FeedbackGenerationFailed(
                    "generator returned an empty reply".to_string(),
                ))
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Feedback generation failed");
                Err(TurnError::FeedbackGenerationFailed(e.to_string()))
            }
        }
    }

    /// Advance the pointer and compute the next prompt. Only reached once
    /// the answer and reply are both persisted.
    async fn finish_turn(
        &self,
        snapshot: &SessionSnapshot,
        answer: &str,
        reply: String,
    ) -> Result<TurnOutcome, TurnError> {
        let index = snapshot.current_index();
        let new_index = index + 1;

        self.store
            .update_pointer(
                &snapshot.session.id,
                i64::try_from(new_index).unwrap_or(i64::MAX),
            )
            .await
            .map_err(TurnError::Store)?;

        let next_question = snapshot.questions.get(new_index).map(|q| q.text.clone());
        let is_complete = next_question.is_none();

        tracing::info!(
            session_id = %snapshot.session.id,
            question_index = index,
            is_complete,
            "Turn advanced"
        );

        Ok(TurnOutcome {
            question_asked: snapshot.questions[index].text.clone(),
            user_answer: answer.to_string(),
            ai_reply: reply,
            next_question,
            is_complete,
        })
    }
}
