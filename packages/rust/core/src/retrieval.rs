//! Keyword-overlap lookup over the knowledge graph.
//!
//! A node matches when any query token occurs as a substring of its
//! `name description details` text. Matches keep the graph order; scores only
//! decide membership. At most [`MAX_CONTEXT_BLOCKS`] nodes are rendered.

use std::path::Path;

use tracing::{debug, instrument, warn};

use quizbank_shared::{KnowledgeBase, KnowledgeNode, QuizBankError, Result};

/// Upper bound on context blocks returned for one query.
pub const MAX_CONTEXT_BLOCKS: usize = 3;

/// Split a query into whitespace-separated tokens after deleting question marks.
pub fn query_tokens(query: &str) -> Vec<String> {
    query
        .replace(['?', '？'], "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Number of tokens that occur somewhere in the node's text.
pub fn score_node<S: AsRef<str>>(tokens: &[S], node: &KnowledgeNode) -> usize {
    let content = format!("{} {} {}", node.name, node.description, node.details);
    tokens
        .iter()
        .filter(|t| {
            let token: &str = t.as_ref();
            content.contains(token)
        })
        .count()
}

/// Render one matched node for prompt injection.
pub fn format_block(node: &KnowledgeNode) -> String {
    format!(
        "concept：{}\n描述：{}\n详情：{}",
        node.name, node.description, node.details
    )
}

/// Matched context for `query`, or an empty string when nothing matches.
pub fn search_knowledge(query: &str, nodes: &[KnowledgeNode]) -> String {
    let tokens = query_tokens(query);
    if tokens.is_empty() {
        return String::new();
    }

    let blocks: Vec<String> = nodes
        .iter()
        .filter(|node| score_node(&tokens, node) > 0)
        .take(MAX_CONTEXT_BLOCKS)
        .map(format_block)
        .collect();

    debug!(tokens = tokens.len(), matched = blocks.len(), "knowledge search");
    blocks.join("\n\n")
}

/// Load the knowledge graph document (or a bare node array).
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_knowledge_base(path: &Path) -> Result<KnowledgeBase> {
    let content = std::fs::read_to_string(path).map_err(|e| QuizBankError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| QuizBankError::json(path, e))
}

/// File-backed search. Any failure yields an empty context and a warning log.
pub fn retrieve_context(path: &Path, query: &str) -> String {
    match load_knowledge_base(path) {
        Ok(kb) => search_knowledge(query, kb.nodes()),
        Err(e) => {
            warn!(error = %e, "knowledge base unavailable, continuing without context");
            String::new()
        }
    }
}
