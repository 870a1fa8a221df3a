//! LLM Client: the single point of entry for every chat-completions call.
//!
//! ARCHITECTURAL RULE: pipeline stages never talk HTTP themselves. They receive a
//! `&dyn ChatModel` (usually through `Services`) and build a `ChatRequest`.
//!
//! Every call is attempted exactly once. There is no retry or backoff layer;
//! callers decide whether a failure is fatal or best-effort.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;
#[cfg(test)]
pub mod testing;

/// Letter drafting from the raw evidence files.
pub const DRAFTING_MODEL: &str = "gpt-4.1";
/// Per-document fact extraction and consolidation.
pub const EXTRACTION_MODEL: &str = "gpt-4o";
/// Fast digest of a drafted letter before precedent research.
pub const DIGEST_MODEL: &str = "gpt-4o-mini";
/// Search-augmented precedent research.
pub const RESEARCH_MODEL: &str = "sonar";
/// Default rubric evaluation model.
pub const EVALUATION_MODEL: &str = "o3-2025-04-16";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Request / response model
// ────────────────────────────────────────────────────────────────────────────

/// One piece of a user message.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// A binary attachment, already base64-encoded.
    File {
        filename: String,
        mime_type: String,
        data_base64: String,
    },
}

/// A single-turn chat request: optional system prompt plus one user message.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub system: Option<String>,
    pub parts: Vec<ContentPart>,
    /// `None` leaves the provider default (reasoning models reject the field).
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            parts: Vec::new(),
            temperature: None,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ContentPart::Text(text.into()));
        self
    }

    pub fn parts(mut self, parts: impl IntoIterator<Item = ContentPart>) -> Self {
        self.parts.extend(parts);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Concatenated text parts, used for logging and by test doubles.
    pub fn user_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::File { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub text: String,
    /// Source URLs reported by search-augmented providers; empty otherwise.
    pub citations: Vec<String>,
}

/// A chat-completions backend. Carried as `Arc<dyn ChatModel>` so stages can be
/// driven by a scripted model in tests.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;
}

/// The model handles for a single run.
#[derive(Clone)]
pub struct Services {
    pub text: Arc<dyn ChatModel>,
    /// Search-augmented model for precedent research, if one is configured.
    pub search: Option<Arc<dyn ChatModel>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire format (OpenAI-compatible /chat/completions)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: WireContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent<'a> {
    Text(String),
    Parts(Vec<WirePart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WirePart<'a> {
    Text { text: &'a str },
    File { file: WireFile<'a> },
}

#[derive(Debug, Serialize)]
struct WireFile<'a> {
    filename: &'a str,
    file_data: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn to_wire(request: &ChatRequest) -> CompletionRequest<'_> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system {
        messages.push(WireMessage {
            role: "system",
            content: WireContent::Text(system.clone()),
        });
    }

    let has_files = request
        .parts
        .iter()
        .any(|p| matches!(p, ContentPart::File { .. }));

    // Text-only requests go out as a plain string; some providers reject part arrays.
    let content = if has_files {
        WireContent::Parts(
            request
                .parts
                .iter()
                .map(|p| match p {
                    ContentPart::Text(text) => WirePart::Text { text },
                    ContentPart::File {
                        filename,
                        mime_type,
                        data_base64,
                    } => WirePart::File {
                        file: WireFile {
                            filename,
                            file_data: format!("data:{mime_type};base64,{data_base64}"),
                        },
                    },
                })
                .collect(),
        )
    } else {
        WireContent::Text(request.user_text())
    };

    messages.push(WireMessage {
        role: "user",
        content,
    });

    CompletionRequest {
        model: &request.model,
        messages,
        temperature: request.temperature,
    }
}

fn from_wire(response: CompletionResponse) -> Result<ChatResponse, LlmError> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|t| !t.trim().is_empty())
        .ok_or(LlmError::EmptyContent)?;

    Ok(ChatResponse {
        text,
        citations: response.citations,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP client
// ────────────────────────────────────────────────────────────────────────────

/// Chat-completions client for one provider (OpenAI or an OpenAI-compatible API).
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = to_wire(&request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: CompletionResponse = serde_json::from_str(&response.text().await?)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "LLM call to {} succeeded: prompt_tokens={}, completion_tokens={}",
                request.model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        from_wire(parsed)
    }
}

/// Strips a ```lang ... ``` fence that wraps the whole model output.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (`markdown`, `md`, ...) on the opening line.
    let body = match stripped.find('\n') {
        Some(i) => &stripped[i + 1..],
        None => stripped,
    };
    body.strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(body.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_only_request_sends_string_content() {
        let request = ChatRequest::new("gpt-4o")
            .system("be terse")
            .text("first")
            .text("second")
            .temperature(0.2);

        let wire = serde_json::to_value(to_wire(&request)).unwrap();
        assert_eq!(
            wire,
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "be terse"},
                    {"role": "user", "content": "first\n\nsecond"}
                ],
                "temperature": wire["temperature"].clone()
            })
        );
        let temperature = wire["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 1e-6, "temperature was {temperature}");
    }

    #[test]
    fn test_file_parts_use_data_url() {
        let request = ChatRequest::new("gpt-4.1")
            .text("draft it")
            .parts([ContentPart::File {
                filename: "police.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                data_base64: "JVBERi0=".to_string(),
            }]);

        let wire = serde_json::to_value(to_wire(&request)).unwrap();
        let content = &wire["messages"][0]["content"];
        assert_eq!(content[0], json!({"type": "text", "text": "draft it"}));
        assert_eq!(content[1]["type"], "file");
        assert_eq!(content[1]["file"]["filename"], "police.pdf");
        assert_eq!(
            content[1]["file"]["file_data"],
            "data:application/pdf;base64,JVBERi0="
        );
        assert!(wire.get("temperature").is_none());
    }

    #[test]
    fn test_response_text_and_citations() {
        let raw = json!({
            "choices": [{"message": {"content": "Smith v. Jones"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3},
            "citations": ["https://example.org/verdict"]
        });
        let parsed: CompletionResponse = serde_json::from_value(raw).unwrap();
        let response = from_wire(parsed).unwrap();
        assert_eq!(response.text, "Smith v. Jones");
        assert_eq!(response.citations, vec!["https://example.org/verdict"]);
    }

    #[test]
    fn test_blank_content_is_empty_error() {
        let raw = json!({"choices": [{"message": {"content": "  "}}]});
        let parsed: CompletionResponse = serde_json::from_value(raw).unwrap();
        assert!(matches!(from_wire(parsed), Err(LlmError::EmptyContent)));

        let raw = json!({"choices": []});
        let parsed: CompletionResponse = serde_json::from_value(raw).unwrap();
        assert!(matches!(from_wire(parsed), Err(LlmError::EmptyContent)));
    }

    #[test]
    fn test_client_endpoint_trims_trailing_slash() {
        let client = LlmClient::new(
            "key".to_string(),
            "https://api.openai.com/v1/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint, "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_strip_code_fences_with_language_tag() {
        let input = "```markdown\n## ASK\nPay.\n```";
        assert_eq!(strip_code_fences(input), "## ASK\nPay.");
    }

    #[test]
    fn test_strip_code_fences_without_tag() {
        let input = "```\n## ASK\n```";
        assert_eq!(strip_code_fences(input), "## ASK");
    }

    #[test]
    fn test_strip_code_fences_no_fences() {
        let input = "  ## ASK\nPay.\n";
        assert_eq!(strip_code_fences(input), "## ASK\nPay.");
    }
}
