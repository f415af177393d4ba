//! OpenAI-compatible chat completion client.
//!
//! Sends `POST {base_url}/chat/completions` with bearer auth and returns the
//! first choice's message content.

use std::time::{Duration, Instant};

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use quizbank_shared::{LlmConfig, QuizBankError, Result};

use crate::chat::{ChatRequest, CompletionService};

/// User-Agent string for completion requests.
const USER_AGENT: &str = concat!("quizbank/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body quoted back in an error message.
const ERROR_BODY_PREVIEW: usize = 300;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Owned handle to a completion endpoint. Construct once and pass it to
/// [`ChatAssistant`](crate::chat::ChatAssistant).
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl OpenAiCompatClient {
    /// Build a client from `[llm]` settings and an already resolved API key.
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = config.completions_url()?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QuizBankError::Completion(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl CompletionService for OpenAiCompatClient {
    #[instrument(skip_all, fields(model = %self.model, messages = request.messages.len()))]
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let start = Instant::now();
        let body = serde_json::json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
        });

        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| QuizBankError::Completion(format!("{}: {e}", self.endpoint)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let preview: String = text.chars().take(ERROR_BODY_PREVIEW).collect();
            return Err(QuizBankError::Completion(format!(
                "{}: HTTP {status}: {preview}",
                self.endpoint
            )));
        }

        let parsed: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| QuizBankError::Completion(format!("malformed response: {e}")))?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| QuizBankError::Completion("response contained no answer".into()))?;

        info!(
            latency_ms = start.elapsed().as_millis() as u64,
            answer_chars = answer.chars().count(),
            "completion received"
        );
        debug!(%answer, "completion text");

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> LlmConfig {
        LlmConfig {
            base_url: format!("{}/v1", server.uri()),
            model: "test-model".into(),
            timeout_secs: 5,
            ..LlmConfig::default()
        }
    }

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![
                ChatMessage::system("你是助教。"),
                ChatMessage::user("什么是极化？"),
            ],
        }
    }

    #[tokio::test]
    async fn complete_returns_first_choice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "messages": [
                    {"role": "system", "content": "你是助教。"},
                    {"role": "user", "content": "什么是极化？"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "极化是……"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config_for(&server), "test-key").unwrap();
        let answer = client.complete(&request()).await.unwrap();
        assert_eq!(answer, "极化是……");
    }

    #[tokio::test]
    async fn http_error_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config_for(&server), "bad").unwrap();
        let err = client.complete(&request()).await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("invalid api key"));
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config_for(&server), "k").unwrap();
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, QuizBankError::Completion(_)));
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let config = LlmConfig {
            base_url: "::nope::".into(),
            ..LlmConfig::default()
        };
        let err = OpenAiCompatClient::new(&config, "k").unwrap_err();
        assert!(matches!(err, QuizBankError::Config { .. }));
    }
}
