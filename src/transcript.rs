//! Transcript assembly
//!
//! Merges finalized messages, the user's in-progress (live) partial
//! utterance, and the system "processing" placeholder into one ordered,
//! display-ready sequence. Finalized history is append-only with stable ids;
//! the two trailing slots are replaced in place and never persisted.

use crate::db::{Question, Response};
use serde::{Deserialize, Serialize};

/// Reserved id for the user's live partial entry
pub const LIVE_PARTIAL_ID: &str = "live-user";
/// Reserved id for the system processing placeholder
pub const PROCESSING_ID: &str = "processing";

const PROCESSING_TEXT: &str = "Thinking it over...";

/// Who said a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Interviewer,
}

/// One display-ready transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    /// True for the two trailing, not-yet-finalized slots
    pub live: bool,
}

impl TranscriptEntry {
    fn finalized(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            live: false,
        }
    }
}

/// Ordered transcript state for one session view
#[derive(Debug, Default)]
pub struct Transcript {
    finalized: Vec<TranscriptEntry>,
    live_partial: Option<String>,
    processing: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project persisted rows into a finalized transcript: the intro, then
    /// for each recorded turn the question asked, the user's answer, and the
    /// AI reply when one exists.
    pub fn from_session(intro: &str, questions: &[Question], responses: &[Response]) -> Self {
        let mut transcript = Self::new();
        transcript.push_finalized(Sender::Interviewer, intro);

        for response in responses {
            if let Some(question) = questions.iter().find(|q| q.id == response.question_id) {
                transcript.push_finalized(Sender::Interviewer, &question.text);
            }
            transcript.push_finalized(Sender::User, &response.user_answer);
            if let Some(reply) = &response.ai_reply {
                transcript.push_finalized(Sender::Interviewer, reply);
            }
        }

        transcript
    }

    /// Append a finalized message with a fresh stable id
    pub fn push_finalized(&mut self, sender: Sender, text: impl Into<String>) -> &TranscriptEntry {
        self.finalized.push(TranscriptEntry::finalized(sender, text));
        self.finalized.last().unwrap()
    }

    /// Replace the user's live partial. There is at most one; repeated calls
    /// overwrite rather than append.
    pub fn set_live_partial(&mut self, text: impl Into<String>) {
        self.live_partial = Some(text.into());
    }

    /// Discard the live partial without finalizing it
    pub fn clear_live_partial(&mut self) {
        self.live_partial = None;
    }

    /// Promote the live partial into finalized history.
    ///
    /// Returns the text to submit, or `None` when there was nothing to
    /// finalize. If the partial's text exactly matches the most recent
    /// finalized user entry, the partial is dropped instead of finalized so a
    /// race with an already-submitted identical answer cannot duplicate it.
    pub fn finalize_partial(&mut self) -> Option<String> {
        let text = self.live_partial.take()?;
        let text = text.trim().to_string();
        if text.is_empty() {
            return None;
        }

        let duplicate = self
            .finalized
            .iter()
            .rev()
            .find(|entry| entry.sender == Sender::User)
            .is_some_and(|entry| entry.text == text);
        if duplicate {
            return None;
        }

        self.push_finalized(Sender::User, &text);
        Some(text)
    }

    /// Show the system placeholder while a reply is being generated
    pub fn begin_processing(&mut self) {
        self.processing = true;
    }

    /// Drop the placeholder; called when the real reply lands or an error is
    /// surfaced
    pub fn end_processing(&mut self) {
        self.processing = false;
    }

    /// The display-ready sequence: finalized history in recorded order, then
    /// the live partial, then the processing placeholder.
    pub fn render(&self) -> Vec<TranscriptEntry> {
        let mut entries = self.finalized.clone();

        if let Some(text) = &self.live_partial {
            entries.push(TranscriptEntry {
                id: LIVE_PARTIAL_ID.to_string(),
                sender: Sender::User,
                text: text.clone(),
                live: true,
            });
        }

        if self.processing {
            entries.push(TranscriptEntry {
                id: PROCESSING_ID.to_string(),
                sender: Sender::Interviewer,
                text: PROCESSING_TEXT.to_string(),
                live: true,
            });
        }

        entries
    }

    pub fn finalized_entries(&self) -> &[TranscriptEntry] {
        &self.finalized
    }

    /// Render the finalized conversation as `sender: text` lines, the shape
    /// the reflection prompt expects.
    pub fn as_conversation_text(&self) -> String {
        self.finalized
            .iter()
            .map(|entry| {
                let sender = match entry.sender {
                    Sender::User => "Candidate",
                    Sender::Interviewer => "Interviewer",
                };
                format!("{sender}: {}", entry.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
