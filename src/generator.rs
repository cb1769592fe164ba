//! Question and feedback generation over the LLM service
//!
//! Both generators are thin, fallible wrappers: prompt in, text out. Output
//! validation (empty list, empty reply) is left to the engine, which owns the
//! error taxonomy.

use crate::llm::{CompletionRequest, LlmError, LlmService};
use crate::prompts;
use std::sync::Arc;

/// How many questions a session asks. The interview ends when this budget is
/// exhausted.
pub const QUESTION_BUDGET: usize = 5;

const QUESTION_MAX_TOKENS: u32 = 1500;
const QUESTION_TEMPERATURE: f32 = 0.8;
const FEEDBACK_MAX_TOKENS: u32 = 500;
const FEEDBACK_TEMPERATURE: f32 = 0.7;

/// Generates the ordered question list for a topic
pub struct QuestionGenerator {
    llm: Arc<dyn LlmService>,
}

impl QuestionGenerator {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }

    /// Ask the model for the session's questions. May legitimately return an
    /// empty list when the model produces nothing usable.
    pub async fn generate(&self, topic: &str) -> Result<Vec<String>, LlmError> {
        let request = CompletionRequest {
            system: Some(prompts::INTERVIEWER_SYSTEM.to_string()),
            prompt: prompts::question_list_prompt(topic, QUESTION_BUDGET),
            max_tokens: QUESTION_MAX_TOKENS,
            temperature: QUESTION_TEMPERATURE,
        };

        let completion = self.llm.complete(&request).await?;
        let questions = parse_question_lines(&completion.text);

        tracing::debug!(
            topic = %topic,
            count = questions.len(),
            "Parsed generated questions"
        );

        Ok(questions)
    }
}

/// Generates the conversational reply to a single answer
pub struct FeedbackGenerator {
    llm: Arc<dyn LlmService>,
}

impl FeedbackGenerator {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }

    pub async fn reply(&self, question: &str, answer: &str) -> Result<String, LlmError> {
        let request = CompletionRequest {
            system: Some(prompts::INTERVIEWER_SYSTEM.to_string()),
            prompt: prompts::feedback_prompt(question, answer),
            max_tokens: FEEDBACK_MAX_TOKENS,
            temperature: FEEDBACK_TEMPERATURE,
        };

        let completion = self.llm.complete(&request).await?;
        Ok(completion.text.trim().to_string())
    }

    /// Closing reflection over the finalized conversation
    pub async fn reflection(&self, conversation: &str) -> Result<String, LlmError> {
        let request = CompletionRequest {
            system: Some(prompts::INTERVIEWER_SYSTEM.to_string()),
            prompt: prompts::reflection_prompt(conversation),
            max_tokens: FEEDBACK_MAX_TOKENS,
            temperature: FEEDBACK_TEMPERATURE,
        };

        let completion = self.llm.complete(&request).await?;
        Ok(completion.text.trim().to_string())
    }
}

/// Extract question lines from the model's free-form output.
///
/// Keeps lines that contain a question mark, stripping list markers and
/// surrounding whitespace.
fn parse_question_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty() && line.contains('?'))
        .map(String::from)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix('-').unwrap_or(line);
    let line = line.strip_prefix('*').unwrap_or(line);

    // Numbered markers like "1." or "2)"
    let stripped = line.trim_start_matches(|c: char| c.is_ascii_digit());
    let line = if stripped.len() < line.len() {
        stripped
            .strip_prefix('.')
            .or_else(|| stripped.strip_prefix(')'))
            .unwrap_or(line)
    } else {
        line
    };

    line.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dashed_list() {
        let text = "- What is a mutex?\n- How does async work?\n";
        assert_eq!(
            parse_question_lines(text),
            vec!["What is a mutex?", "How does async work?"]
        );
    }

    #[test]
    fn test_parse_numbered_list() {
        let text = "1. What is a mutex?\n2) How does async work?";
        assert_eq!(
            parse_question_lines(text),
            vec!["What is a mutex?", "How does async work?"]
        );
    }

    #[test]
    fn test_parse_skips_prose_without_question_mark() {
        let text = "Here are your questions:\n\n- What is a mutex?\n- Good luck!";
        assert_eq!(parse_question_lines(text), vec!["What is a mutex?"]);
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_question_lines("").is_empty());
        assert!(parse_question_lines("No usable content here.").is_empty());
    }

    #[test]
    fn test_numbered_topic_not_mangled() {
        // A line that merely starts with digits keeps its text
        let text = "24/7 support sounds hard, doesn't it?";
        assert_eq!(parse_question_lines(text), vec![text]);
    }
}
