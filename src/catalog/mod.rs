//! Shared problem catalog
//!
//! The catalog is a list of topics, each stored as a single document in the
//! shared catalog collection and seeded from a static set on first run.

pub mod model;
pub mod seed;

// Re-exports
pub use model::{
    Approach, Difficulty, Question, Topic, decode_catalog, find_question, question_count,
};
pub use seed::{cses_problem_set, document_key, seed_documents};
