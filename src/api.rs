//! HTTP API for drillroom

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::db::Database;
use crate::engine::{DatabaseStore, ProductionEngine, TurnEngine};
use crate::generator::{FeedbackGenerator, QuestionGenerator};
use crate::llm::LlmService;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ProductionEngine>,
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database, llm: Arc<dyn LlmService>) -> Self {
        let engine = TurnEngine::new(
            DatabaseStore::new(db.clone()),
            QuestionGenerator::new(llm.clone()),
            FeedbackGenerator::new(llm),
        );
        Self {
            engine: Arc::new(engine),
            db,
        }
    }
}
