//! Application layer - use cases and orchestration.
//!
//! Services here orchestrate domain logic through ports (traits) and never
//! depend on concrete infrastructure.

pub mod knowledge_base;
pub mod services;

pub use knowledge_base::KnowledgeBase;
pub use services::{IndexSync, QaAnswer, QaService, NO_RESULTS_ANSWER, SERVICE_FAILURE_ANSWER};
