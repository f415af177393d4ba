//! Core domain types: question bank records and knowledge graph nodes.

use serde::{Deserialize, Deserializer, Serialize};

/// Section name given to questions that appear before any `##` header.
pub const DEFAULT_SECTION: &str = "默认章节";

fn default_section() -> String {
    DEFAULT_SECTION.to_string()
}

// ---------------------------------------------------------------------------
// QuestionType
// ---------------------------------------------------------------------------

/// Whether a question is answered by picking a label or by writing text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Choice,
    Fill,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Choice => "choice",
            Self::Fill => "fill",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// QuestionRecord
// ---------------------------------------------------------------------------

/// One lettered option of a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// One of `A`..`D`.
    pub label: String,
    /// Option text, trimmed. May be empty.
    pub content: String,
}

impl QuestionOption {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }
}

/// A single question of the bank, as persisted in `questions.json`.
///
/// Missing or `null` fields decode to their defaults so that hand-edited banks
/// still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Leading number of the question line in the source document.
    pub id: u64,
    /// Question text after the leading number.
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    /// Options in discovery order, possibly gathered from several lines.
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<QuestionOption>,
    /// Answer text; empty when the document had no answer line.
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: QuestionType,
    /// Most recent `##` header seen before the question started.
    #[serde(default = "default_section")]
    pub section: String,
}

impl QuestionRecord {
    /// A freshly opened record: no options, no answer, classified as choice.
    pub fn open(id: u64, question: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            id,
            question: question.into(),
            options: Vec::new(),
            answer: String::new(),
            kind: QuestionType::Choice,
            section: section.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Knowledge graph
// ---------------------------------------------------------------------------

/// A concept in the knowledge graph. Only the text fields take part in retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeNode {
    /// Graph identifier; strings in practice, but any JSON scalar is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: String,
}

impl KnowledgeNode {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            details: details.into(),
            ..Self::default()
        }
    }

    /// The node id rendered as plain text (`"prof_li"`, `"42"`).
    pub fn id_text(&self) -> Option<String> {
        self.id.as_ref().map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The graph document served to the front end (`data.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub nodes: Vec<KnowledgeNode>,
    #[serde(default)]
    pub links: Vec<serde_json::Value>,
    #[serde(default)]
    pub categories: Vec<serde_json::Value>,
}

/// Either a full graph document or a bare array of nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KnowledgeBase {
    Graph(KnowledgeGraph),
    Nodes(Vec<KnowledgeNode>),
}

impl KnowledgeBase {
    pub fn nodes(&self) -> &[KnowledgeNode] {
        match self {
            Self::Graph(graph) => &graph.nodes,
            Self::Nodes(nodes) => nodes,
        }
    }
}
