//! Knowledge-grounded chat assistant.
//!
//! Retrieves context for the user's message, assembles the system prompt and
//! forwards both to a [`CompletionService`]. The service handle is owned by the
//! assistant and supplied at construction.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use quizbank_shared::{QuizBankError, Result};

use crate::retrieval::retrieve_context;

/// Fixed instructions given to the model on every request.
pub const INSTRUCTION_PREAMBLE: &str = "你是一位电介质物理课程的助教。请用简洁、准确的中文回答学生的问题。\
如果提供的资料不足以回答，请结合通用的物理知识作答。";

/// Heading placed above retrieved context.
const CONTEXT_HEADING: &str = "以下是知识图谱中与问题相关的资料：";

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Everything a completion service needs for one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// The answer handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub answer: String,
    /// Whether retrieved knowledge was included in the prompt.
    #[serde(skip)]
    pub used_context: bool,
}

// ---------------------------------------------------------------------------
// Service seam
// ---------------------------------------------------------------------------

/// An external language model that turns messages into an answer.
pub trait CompletionService: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> impl Future<Output = Result<String>> + Send;
}

/// System prompt for a given retrieval context. Context, when present,
/// comes before the preamble.
pub fn build_system_prompt(context: &str) -> String {
    if context.is_empty() {
        INSTRUCTION_PREAMBLE.to_string()
    } else {
        format!("{CONTEXT_HEADING}\n{context}\n\n{INSTRUCTION_PREAMBLE}")
    }
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

pub struct ChatAssistant<S> {
    service: S,
    knowledge_path: PathBuf,
}

impl<S: CompletionService> ChatAssistant<S> {
    pub fn new(service: S, knowledge_path: impl Into<PathBuf>) -> Self {
        Self {
            service,
            knowledge_path: knowledge_path.into(),
        }
    }

    /// Build the request for `message` without sending it.
    pub fn prepare(&self, message: &str) -> Result<(ChatRequest, bool)> {
        let message = message.trim();
        if message.is_empty() {
            return Err(QuizBankError::validation("message must not be empty"));
        }

        let context = retrieve_context(&self.knowledge_path, message);
        let used_context = !context.is_empty();
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(build_system_prompt(&context)),
                ChatMessage::user(message),
            ],
        };

        Ok((request, used_context))
    }

    /// Answer one user message.
    #[instrument(skip_all, fields(knowledge = %self.knowledge_path.display()))]
    pub async fn ask(&self, message: &str) -> Result<ChatReply> {
        let (request, used_context) = self.prepare(message)?;
        info!(used_context, "sending chat request");

        let answer = self.service.complete(&request).await?;
        Ok(ChatReply {
            answer,
            used_context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const FIXTURE: &str = "../../../fixtures/json/knowledge.fixture.json";

    /// Records every request and answers with a canned reply.
    #[derive(Default)]
    struct RecordingService {
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl CompletionService for RecordingService {
        async fn complete(&self, request: &ChatRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            Ok("好的".into())
        }
    }

    struct FailingService;

    impl CompletionService for FailingService {
        async fn complete(&self, _request: &ChatRequest) -> Result<String> {
            Err(QuizBankError::Completion("upstream down".into()))
        }
    }

    #[test]
    fn prompt_without_context_is_preamble() {
        assert_eq!(build_system_prompt(""), INSTRUCTION_PREAMBLE);
    }

    #[test]
    fn prompt_puts_context_first() {
        let prompt = build_system_prompt("concept：极化\n描述：a\n详情：b");
        assert!(prompt.starts_with(CONTEXT_HEADING));
        assert!(prompt.ends_with(INSTRUCTION_PREAMBLE));
        assert!(prompt.contains("concept：极化"));
    }

    #[test]
    fn message_serializes_with_lowercase_role() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn reply_serializes_answer_only() {
        let reply = ChatReply {
            answer: "答".into(),
            used_context: true,
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({"answer": "答"})
        );
    }

    #[tokio::test]
    async fn ask_includes_matching_context() {
        let assistant = ChatAssistant::new(RecordingService::default(), FIXTURE);
        let reply = assistant.ask("  介质损耗  ").await.unwrap();
        assert_eq!(reply.answer, "好的");
        assert!(reply.used_context);

        let seen = assistant.service.seen.lock().unwrap();
        let messages = &seen[0].messages;
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("concept：介质损耗"));
        assert_eq!(messages[1], ChatMessage::user("介质损耗"));
    }

    #[tokio::test]
    async fn ask_without_knowledge_uses_preamble_only() {
        let assistant =
            ChatAssistant::new(RecordingService::default(), "../../../fixtures/json/none.json");
        let reply = assistant.ask("什么是极化？").await.unwrap();
        assert!(!reply.used_context);

        let seen = assistant.service.seen.lock().unwrap();
        assert_eq!(seen[0].messages[0].content, INSTRUCTION_PREAMBLE);
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let assistant = ChatAssistant::new(RecordingService::default(), FIXTURE);
        let err = assistant.ask("   ").await.unwrap_err();
        assert!(matches!(err, QuizBankError::Validation { .. }));
        assert!(assistant.service.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn service_failure_propagates() {
        let assistant = ChatAssistant::new(FailingService, FIXTURE);
        let err = assistant.ask("极化").await.unwrap_err();
        assert!(err.to_string().contains("upstream down"));
    }
}
