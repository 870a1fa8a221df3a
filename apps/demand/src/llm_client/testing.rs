//! Scripted `ChatModel` for driving pipeline stages without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatModel, ChatRequest, ChatResponse, LlmError};

/// Replays queued responses in order and records every request it receives.
/// Running out of responses yields `LlmError::EmptyContent`.
#[derive(Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.push(Ok(ChatResponse {
            text: text.to_string(),
            citations: Vec::new(),
        }))
    }

    pub fn reply_with_citations(self, text: &str, citations: &[&str]) -> Self {
        self.push(Ok(ChatResponse {
            text: text.to_string(),
            citations: citations.iter().map(|c| c.to_string()).collect(),
        }))
    }

    pub fn fail(self, status: u16) -> Self {
        self.push(Err(LlmError::Api {
            status,
            message: "scripted failure".to_string(),
        }))
    }

    fn push(self, response: Result<ChatResponse, LlmError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}
