//! Database module for drillroom
//!
//! Provides persistence for interview sessions, their generated questions,
//! and the recorded turns.

mod schema;

pub use schema::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Response not found: {0}")]
    ResponseNotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;

        // Try to add the audio column - ignore error if it already exists
        let _ = conn.execute("ALTER TABLE responses ADD COLUMN audio_url TEXT", []);

        Ok(())
    }

    // ==================== Session Operations ====================

    /// Create a new session for a topic
    pub fn create_session(&self, id: &str, user_id: &str, topic: &str) -> DbResult<Session> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO sessions (id, user_id, topic, current_question_index, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)",
            params![id, user_id, topic, now.to_rfc3339()],
        )?;

        Ok(Session {
            id: id.to_string(),
            user_id: user_id.to_string(),
            topic: topic.to_string(),
            current_question_index: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get session by ID
    pub fn get_session(&self, id: &str) -> DbResult<Session> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, topic, current_question_index, created_at, updated_at
             FROM sessions WHERE id = ?1",
        )?;

        stmt.query_row(params![id], parse_session_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => DbError::SessionNotFound(id.to_string()),
                other => DbError::Sqlite(other),
            })
    }

    /// List a user's sessions, most recently active first
    pub fn list_sessions(&self, user_id: &str) -> DbResult<Vec<Session>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, topic, current_question_index, created_at, updated_at
             FROM sessions WHERE user_id = ?1 ORDER BY updated_at DESC",
        )?;

        let rows = stmt.query_map(params![user_id], parse_session_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Advance the session's current-question pointer
    pub fn update_session_pointer(&self, id: &str, new_index: i64) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let updated = conn.execute(
            "UPDATE sessions SET current_question_index = ?1, updated_at = ?2 WHERE id = ?3",
            params![new_index, now.to_rfc3339(), id],
        )?;

        if updated == 0 {
            return Err(DbError::SessionNotFound(id.to_string()));
        }
        Ok(())
    }

    // ==================== Question Operations ====================

    /// Create the session's question list in asking order.
    ///
    /// Inserted in one transaction so a concurrent reader sees the full list
    /// or nothing.
    pub fn create_questions(&self, session_id: &str, texts: &[String]) -> DbResult<Vec<Question>> {
        let mut conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let tx = conn.transaction()?;
        let mut questions = Vec::with_capacity(texts.len());

        for (position, text) in texts.iter().enumerate() {
            let id = uuid::Uuid::new_v4().to_string();
            let position = i64::try_from(position).unwrap_or(i64::MAX);
            let category = QuestionCategory::classify(text);

            tx.execute(
                "INSERT INTO questions (id, session_id, position, text, category, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, session_id, position, text, category.as_str(), now.to_rfc3339()],
            )?;

            questions.push(Question {
                id,
                session_id: session_id.to_string(),
                position,
                text: text.clone(),
                category,
                created_at: now,
            });
        }

        tx.commit()?;
        Ok(questions)
    }

    /// Get the session's questions in asking order
    pub fn get_questions(&self, session_id: &str) -> DbResult<Vec<Question>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, position, text, category, created_at
             FROM questions WHERE session_id = ?1 ORDER BY position ASC",
        )?;

        let rows = stmt.query_map(params![session_id], parse_question_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    // ==================== Response Operations ====================

    /// Record a user answer against a question. The AI reply is attached
    /// later, once generation succeeds.
    pub fn create_response(
        &self,
        id: &str,
        session_id: &str,
        question_id: &str,
        user_answer: &str,
        audio_url: Option<&str>,
    ) -> DbResult<Response> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO responses (id, session_id, question_id, user_answer, audio_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, session_id, question_id, user_answer, audio_url, now.to_rfc3339()],
        )?;

        Ok(Response {
            id: id.to_string(),
            session_id: session_id.to_string(),
            question_id: question_id.to_string(),
            user_answer: user_answer.to_string(),
            ai_reply: None,
            audio_url: audio_url.map(String::from),
            created_at: now,
        })
    }

    /// Attach the AI reply to an existing turn record
    pub fn attach_reply(&self, response_id: &str, reply: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();

        let updated = conn.execute(
            "UPDATE responses SET ai_reply = ?1 WHERE id = ?2",
            params![reply, response_id],
        )?;

        if updated == 0 {
            return Err(DbError::ResponseNotFound(response_id.to_string()));
        }
        Ok(())
    }

    /// Get the session's recorded turns in recording order
    pub fn get_responses(&self, session_id: &str) -> DbResult<Vec<Response>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, question_id, user_answer, ai_reply, audio_url, created_at
             FROM responses WHERE session_id = ?1 ORDER BY rowid ASC",
        )?;

        let rows = stmt.query_map(params![session_id], parse_response_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Find the most recent answer to a question that is still awaiting its
    /// AI reply (used to resume a turn after a failed generation).
    pub fn open_response(&self, session_id: &str, question_id: &str) -> DbResult<Option<Response>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, question_id, user_answer, ai_reply, audio_url, created_at
             FROM responses
             WHERE session_id = ?1 AND question_id = ?2 AND ai_reply IS NULL
             ORDER BY rowid DESC LIMIT 1",
        )?;

        match stmt.query_row(params![session_id, question_id], parse_response_row) {
            Ok(response) => Ok(Some(response)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::Sqlite(e)),
        }
    }
}

fn parse_session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        user_id: row.get(1)?,
        topic: row.get(2)?,
        current_question_index: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn parse_question_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Question> {
    Ok(Question {
        id: row.get(0)?,
        session_id: row.get(1)?,
        position: row.get(2)?,
        text: row.get(3)?,
        category: QuestionCategory::parse(&row.get::<_, String>(4)?),
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn parse_response_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Response> {
    Ok(Response {
        id: row.get(0)?,
        session_id: row.get(1)?,
        question_id: row.get(2)?,
        user_answer: row.get(3)?,
        ai_reply: row.get(4)?,
        audio_url: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_session(db: &Database) -> (Session, Vec<Question>) {
        let session = db.create_session("sess-1", "user-1", "rust backend").unwrap();
        let questions = db
            .create_questions(
                "sess-1",
                &[
                    "What is ownership in Rust?".to_string(),
                    "Tell me about a time you debugged a deadlock?".to_string(),
                ],
            )
            .unwrap();
        (session, questions)
    }

    #[test]
    fn test_create_and_get_session() {
        let db = Database::open_in_memory().unwrap();
        let (session, _) = seeded_session(&db);

        assert_eq!(session.current_question_index, 0);

        let fetched = db.get_session("sess-1").unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.topic, "rust backend");
    }

    #[test]
    fn test_get_session_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.get_session("missing"),
            Err(DbError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_questions_keep_asking_order() {
        let db = Database::open_in_memory().unwrap();
        let (_, questions) = seeded_session(&db);

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].position, 0);
        assert_eq!(questions[0].category, QuestionCategory::Technical);
        assert_eq!(questions[1].category, QuestionCategory::Behavioral);

        let fetched = db.get_questions("sess-1").unwrap();
        assert_eq!(
            fetched.iter().map(|q| q.position).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_response_reply_attached_to_same_row() {
        let db = Database::open_in_memory().unwrap();
        let (_, questions) = seeded_session(&db);

        let response = db
            .create_response("resp-1", "sess-1", &questions[0].id, "It is move semantics.", None)
            .unwrap();
        assert!(response.ai_reply.is_none());

        let open = db.open_response("sess-1", &questions[0].id).unwrap();
        assert_eq!(open.unwrap().id, "resp-1");

        db.attach_reply("resp-1", "Good summary.").unwrap();

        let all = db.get_responses("sess-1").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].ai_reply.as_deref(), Some("Good summary."));

        // No longer open once the reply is attached
        assert!(db.open_response("sess-1", &questions[0].id).unwrap().is_none());
    }

    #[test]
    fn test_pointer_update() {
        let db = Database::open_in_memory().unwrap();
        let (_, _) = seeded_session(&db);

        db.update_session_pointer("sess-1", 1).unwrap();
        assert_eq!(db.get_session("sess-1").unwrap().current_question_index, 1);

        assert!(matches!(
            db.update_session_pointer("missing", 1),
            Err(DbError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_list_sessions_scoped_to_user() {
        let db = Database::open_in_memory().unwrap();
        db.create_session("a", "user-1", "topic a").unwrap();
        db.create_session("b", "user-2", "topic b").unwrap();

        let sessions = db.list_sessions("user-1").unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "a");
    }
}
