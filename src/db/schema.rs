//! Database schema and record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    topic TEXT NOT NULL,
    current_question_index INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id, updated_at DESC);

CREATE TABLE IF NOT EXISTS questions (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    text TEXT NOT NULL,
    category TEXT NOT NULL,
    created_at TEXT NOT NULL,

    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_questions_position ON questions(session_id, position);

CREATE TABLE IF NOT EXISTS responses (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    question_id TEXT NOT NULL,
    user_answer TEXT NOT NULL,
    ai_reply TEXT,
    audio_url TEXT,
    created_at TEXT NOT NULL,

    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE,
    FOREIGN KEY (question_id) REFERENCES questions(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_responses_session ON responses(session_id);
";

/// Interview session record
///
/// Completion is derived from the pointer, never stored: a session is
/// complete exactly when `current_question_index` has reached the number of
/// questions created for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub topic: String,
    pub current_question_index: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn is_complete(&self, question_count: usize) -> bool {
        usize::try_from(self.current_question_index).map_or(true, |idx| idx >= question_count)
    }
}

/// A generated interview question. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub session_id: String,
    pub position: i64,
    pub text: String,
    pub category: QuestionCategory,
    pub created_at: DateTime<Utc>,
}

/// Coarse question category, derived by keyword inspection of the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Behavioral,
    Situational,
    Technical,
    ProblemSolving,
    General,
}

impl QuestionCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionCategory::Behavioral => "behavioral",
            QuestionCategory::Situational => "situational",
            QuestionCategory::Technical => "technical",
            QuestionCategory::ProblemSolving => "problem_solving",
            QuestionCategory::General => "general",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "behavioral" => QuestionCategory::Behavioral,
            "situational" => QuestionCategory::Situational,
            "technical" => QuestionCategory::Technical,
            "problem_solving" => QuestionCategory::ProblemSolving,
            _ => QuestionCategory::General,
        }
    }

    /// Classify a question by inspecting its phrasing.
    ///
    /// Checks run in order of specificity; the first match wins.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();

        const BEHAVIORAL: &[&str] = &[
            "tell me about a time",
            "describe a time",
            "describe a situation",
            "give an example of a time",
            "have you ever",
        ];
        const SITUATIONAL: &[&str] = &[
            "what would you do",
            "how would you handle",
            "how would you respond",
            "imagine",
            "suppose",
            "if you were",
        ];
        const PROBLEM_SOLVING: &[&str] = &[
            "how would you solve",
            "how would you approach",
            "how would you debug",
            "how would you improve",
            "walk me through",
            "troubleshoot",
        ];
        const TECHNICAL: &[&str] = &[
            "explain",
            "what is",
            "what are",
            "how does",
            "how do",
            "implement",
            "design",
            "difference between",
        ];

        let matches = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if matches(BEHAVIORAL) {
            QuestionCategory::Behavioral
        } else if matches(SITUATIONAL) {
            QuestionCategory::Situational
        } else if matches(PROBLEM_SOLVING) {
            QuestionCategory::ProblemSolving
        } else if matches(TECHNICAL) {
            QuestionCategory::Technical
        } else {
            QuestionCategory::General
        }
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded turn: the user's answer and, once generation succeeds, the
/// paired AI reply. Both live in one row so a reader can never observe a
/// reply without its answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    pub session_id: String,
    pub question_id: String,
    pub user_answer: String,
    pub ai_reply: Option<String>,
    pub audio_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
