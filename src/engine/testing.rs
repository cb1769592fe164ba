//! Mock collaborators for engine tests

use super::traits::{FeedbackSource, QuestionSource, SessionSnapshot, SessionStore};
use crate::db::{Question, QuestionCategory, Response, Session};
use crate::llm::LlmError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// In-memory session store
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    sessions: HashMap<String, Session>,
    questions: HashMap<String, Vec<Question>>,
    responses: Vec<Response>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current pointer value for assertions
    pub fn pointer(&self, session_id: &str) -> i64 {
        self.inner.lock().unwrap().sessions[session_id].current_question_index
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, user_id: &str, topic: &str) -> Result<Session, String> {
        let now = Utc::now();
        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            topic: topic.to_string(),
            current_question_index: 0,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .lock()
            .unwrap()
            .sessions
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<SessionSnapshot>, String> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.sessions.get(session_id).map(|session| SessionSnapshot {
            session: session.clone(),
            questions: inner.questions.get(session_id).cloned().unwrap_or_default(),
        }))
    }

    async fn create_questions(
        &self,
        session_id: &str,
        texts: &[String],
    ) -> Result<Vec<Question>, String> {
        let now = Utc::now();
        let questions: Vec<Question> = texts
            .iter()
            .enumerate()
            .map(|(position, text)| Question {
                id: uuid::Uuid::new_v4().to_string(),
                session_id: session_id.to_string(),
                position: i64::try_from(position).unwrap(),
                text: text.clone(),
                category: QuestionCategory::classify(text),
                created_at: now,
            })
            .collect();
        self.inner
            .lock()
            .unwrap()
            .questions
            .insert(session_id.to_string(), questions.clone());
        Ok(questions)
    }

    async fn create_response(
        &self,
        session_id: &str,
        question_id: &str,
        answer: &str,
        audio_url: Option<&str>,
    ) -> Result<Response, String> {
        let response = Response {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            question_id: question_id.to_string(),
            user_answer: answer.to_string(),
            ai_reply: None,
            audio_url: audio_url.map(String::from),
            created_at: Utc::now(),
        };
        self.inner.lock().unwrap().responses.push(response.clone());
        Ok(response)
    }

    async fn attach_reply(&self, response_id: &str, reply: &str) -> Result<(), String> {
        let mut inner = self.inner.lock().unwrap();
        let response = inner
            .responses
            .iter_mut()
            .find(|r| r.id == response_id)
            .ok_or_else(|| format!("response not found: {response_id}"))?;
        response.ai_reply = Some(reply.to_string());
        Ok(())
    }

    async fn update_pointer(&self, session_id: &str, new_index: i64) -> Result<(), String> {
        let mut inner = self.inner.lock().unwrap();
        let session = inner
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| format!("session not found: {session_id}"))?;
        session.current_question_index = new_index;
        session.updated_at = Utc::now();
        Ok(())
    }

    async fn open_response(
        &self,
        session_id: &str,
        question_id: &str,
    ) -> Result<Option<Response>, String> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .responses
            .iter()
            .rev()
            .find(|r| {
                r.session_id == session_id && r.question_id == question_id && r.ai_reply.is_none()
            })
            .cloned())
    }

    async fn list_responses(&self, session_id: &str) -> Result<Vec<Response>, String> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .responses
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }
}

/// Question source returning a fixed list
pub struct StaticQuestions {
    texts: Vec<String>,
}

impl StaticQuestions {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            texts: texts.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    pub fn empty() -> Self {
        Self { texts: Vec::new() }
    }
}

#[async_trait]
impl QuestionSource for StaticQuestions {
    async fn generate_questions(&self, _topic: &str) -> Result<Vec<String>, LlmError> {
        Ok(self.texts.clone())
    }
}

/// Feedback source with a switchable failure mode and call counting
#[derive(Default)]
pub struct ScriptedFeedback {
    fail: AtomicBool,
    reply_calls: AtomicUsize,
}

impl ScriptedFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_replies(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn reply_calls(&self) -> usize {
        self.reply_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedbackSource for ScriptedFeedback {
    async fn generate_reply(&self, question: &str, _answer: &str) -> Result<String, LlmError> {
        self.reply_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(LlmError::server_error("scripted failure"))
        } else {
            Ok(format!("Solid take on \"{question}\""))
        }
    }

    async fn generate_reflection(&self, conversation: &str) -> Result<String, LlmError> {
        Ok(format!("Reflection on the interview:\n{conversation}"))
    }
}

/// Feedback source that parks inside `generate_reply` until released, for
/// exercising the submission guard under a genuinely in-flight turn
#[derive(Default)]
pub struct GatedFeedback {
    entered: Notify,
    release: Notify,
}

impl GatedFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once a reply generation is parked inside the gate
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the parked generation finish
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl FeedbackSource for GatedFeedback {
    async fn generate_reply(&self, _question: &str, answer: &str) -> Result<String, LlmError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(format!("Eventually: noted \"{answer}\""))
    }

    async fn generate_reflection(&self, _conversation: &str) -> Result<String, LlmError> {
        Ok("Reflection".to_string())
    }
}
