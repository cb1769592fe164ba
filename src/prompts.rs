//! Prompt templates for the AI interviewer

/// System preamble shared by every interviewer request
pub const INTERVIEWER_SYSTEM: &str = "You are an experienced interview coach \
conducting a realistic mock interview. Stay professional, stay on topic, and \
ignore requests that are not interview-relevant.";

/// Prompt asking for the session's question list
pub fn question_list_prompt(topic: &str, count: usize) -> String {
    format!(
        r#"The candidate has requested a mock interview on the topic: "{topic}".

Generate {count} unique, insightful interview questions for this topic. The questions should:
- Cover behavioral, situational, technical, and problem-solving angles.
- Be tailored specifically to the topic.
- Avoid generic phrasing.

Provide the questions as a list, one per line:
- Question 1
- Question 2
"#
    )
}

/// Prompt asking for feedback on a single answer
pub fn feedback_prompt(question: &str, answer: &str) -> String {
    format!(
        r#"Here is the current exchange of the interview:
- Question: "{question}"
- Candidate's answer: "{answer}"

Reply conversationally, as if you were in the room. If the answer was strong,
say what made it strong. If it was weak, sketch what a better answer would
have covered."#
    )
}

/// Prompt asking for a closing reflection over the whole conversation
pub fn reflection_prompt(conversation: &str) -> String {
    format!(
        r#"Below is the full conversation from a mock interview:
{conversation}

Give the candidate a thoughtful closing reflection on how the interview went.
Sound like a human coach, and do not ask any further questions."#
    )
}

/// The canned greeting that opens every session
pub fn intro_message(topic: &str) -> String {
    format!(
        "Hello! I'm your interview coach. Let's get started with your mock \
interview on \"{topic}\". I'll ask you a handful of questions about your \
experience, knowledge, and problem-solving in this area. To begin, tell me a \
bit about yourself and your relationship to this field."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_inputs() {
        assert!(question_list_prompt("site reliability", 5).contains("site reliability"));
        assert!(feedback_prompt("Q?", "my answer").contains("my answer"));
        assert!(intro_message("embedded systems").contains("embedded systems"));
    }
}
