//! Question bank operations built on the parser and shared types.
//!
//! This crate persists and checks the parsed bank, scans the knowledge graph
//! for context, and assembles knowledge-grounded chat requests.

pub mod bank;
pub mod chat;
pub mod completion;
pub mod graph;
pub mod retrieval;
pub mod validate;

pub use bank::{load_bank, read_bank_raw, save_bank};
pub use chat::{ChatAssistant, ChatReply, CompletionService};
pub use completion::OpenAiCompatClient;
pub use graph::{GraphStats, find_node};
pub use retrieval::{MAX_CONTEXT_BLOCKS, load_knowledge_base, retrieve_context, search_knowledge};
pub use validate::{BankReport, BankWarning, check_bank_file, validate_bank};
