//! Shared types, error model, and configuration for the question bank tools.
//!
//! This crate is the foundation depended on by all other quizbank crates.
//! It provides:
//! - [`QuizBankError`]: the unified error type
//! - Domain types ([`QuestionRecord`], [`QuestionOption`], [`QuestionType`], [`KnowledgeNode`])
//! - Configuration ([`AppConfig`], [`DataConfig`], [`LlmConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DataConfig, LlmConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from, resolve_api_key, validate_api_key,
};
pub use error::{QuizBankError, Result};
pub use types::{
    DEFAULT_SECTION, KnowledgeBase, KnowledgeGraph, KnowledgeNode, QuestionOption,
    QuestionRecord, QuestionType,
};
