//! Property tests for session progression invariants

use super::testing::{MemoryStore, ScriptedFeedback, StaticQuestions};
use super::traits::SessionStore;
use super::{TurnEngine, TurnError};
use crate::db::QuestionCategory;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::sync::Arc;

fn question_list() -> impl Strategy<Value = Vec<String>> {
    (1usize..=5).prop_map(|n| (0..n).map(|i| format!("Question {i}?")).collect())
}

fn answers() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z ]{0,23}", 0..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The pointer never decreases, never exceeds the question count, and
    /// every accepted answer moves it by exactly one.
    #[test]
    fn prop_pointer_monotonic_and_bounded(
        questions in question_list(),
        answers in answers(),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let budget = questions.len();
            let store = Arc::new(MemoryStore::new());
            let engine = TurnEngine::new(
                store.clone(),
                StaticQuestions::new(&questions.iter().map(String::as_str).collect::<Vec<_>>()),
                Arc::new(ScriptedFeedback::new()),
            );

            let id = engine.start_session("user", "topic").await.unwrap().session.id;
            let mut last_pointer = 0;

            for (i, answer) in answers.iter().enumerate() {
                let result = engine.advance_turn(&id, answer, None).await;
                let pointer = store.pointer(&id);

                prop_assert!(pointer >= last_pointer, "pointer went backwards");
                prop_assert!(
                    usize::try_from(pointer).unwrap() <= budget,
                    "pointer passed the question count"
                );
                match result {
                    Ok(outcome) => {
                        prop_assert_eq!(pointer, last_pointer + 1);
                        prop_assert_eq!(outcome.is_complete, usize::try_from(pointer).unwrap() == budget);
                    }
                    Err(TurnError::SessionAlreadyComplete) => {
                        prop_assert!(i >= budget);
                        prop_assert_eq!(pointer, last_pointer);
                    }
                    Err(other) => return Err(TestCaseError::fail(format!("unexpected error: {other}"))),
                }
                last_pointer = pointer;
            }
            Ok(())
        })?;
    }

    /// Once terminal, a session accepts nothing: no pointer movement and no
    /// new turn records, no matter how often it is poked.
    #[test]
    fn prop_terminal_state_is_idempotent(
        questions in question_list(),
        extra_calls in 1usize..5,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let budget = questions.len();
            let store = Arc::new(MemoryStore::new());
            let engine = TurnEngine::new(
                store.clone(),
                StaticQuestions::new(&questions.iter().map(String::as_str).collect::<Vec<_>>()),
                Arc::new(ScriptedFeedback::new()),
            );

            let id = engine.start_session("user", "topic").await.unwrap().session.id;
            for i in 0..budget {
                engine.advance_turn(&id, &format!("answer {i}"), None).await.unwrap();
            }

            for _ in 0..extra_calls {
                let err = engine.advance_turn(&id, "late answer", None).await.unwrap_err();
                prop_assert!(matches!(err, TurnError::SessionAlreadyComplete));
            }

            prop_assert_eq!(store.pointer(&id), i64::try_from(budget).unwrap());
            prop_assert_eq!(store.list_responses(&id).await.unwrap().len(), budget);
            Ok(())
        })?;
    }

    /// Classification is total and stable through its string encoding.
    #[test]
    fn prop_classification_round_trips(text in ".{0,200}") {
        let category = QuestionCategory::classify(&text);
        prop_assert_eq!(QuestionCategory::parse(category.as_str()), category);
    }
}
