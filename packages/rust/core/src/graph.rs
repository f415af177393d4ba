//! Knowledge graph summary and node lookup.

use std::collections::BTreeSet;

use quizbank_shared::{KnowledgeBase, KnowledgeNode};

/// Headline numbers shown for a knowledge graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: usize,
    pub relations: usize,
    pub categories: usize,
}

impl GraphStats {
    /// Count nodes, links and categories. A bare node array has no links, and
    /// its categories are the distinct `category` values of its nodes.
    pub fn of(kb: &KnowledgeBase) -> Self {
        match kb {
            KnowledgeBase::Graph(graph) => Self {
                nodes: graph.nodes.len(),
                relations: graph.links.len(),
                categories: graph.categories.len(),
            },
            KnowledgeBase::Nodes(nodes) => Self {
                nodes: nodes.len(),
                relations: 0,
                categories: nodes
                    .iter()
                    .filter_map(|n| n.category.as_deref())
                    .collect::<BTreeSet<_>>()
                    .len(),
            },
        }
    }
}

/// First node whose id or name equals `key`.
pub fn find_node<'a>(kb: &'a KnowledgeBase, key: &str) -> Option<&'a KnowledgeNode> {
    kb.nodes()
        .iter()
        .find(|n| n.id_text().as_deref() == Some(key) || n.name == key)
}
