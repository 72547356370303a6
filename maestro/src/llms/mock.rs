//! Scripted provider for tests and offline development.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::{LlmError, LlmErrorKind};

/// A provider that replays a fixed script of responses.
///
/// Each call consumes the next scripted response; once the script is
/// exhausted the last response is repeated, which makes step-limit
/// tests straightforward. Every request is recorded and can be
/// inspected afterwards.
pub struct MockProvider {
    responses: Vec<ChatResponse>,
    next: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
    fail_with: Option<LlmErrorKind>,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("responses", &self.responses.len())
            .field("calls", &self.call_count())
            .finish()
    }
}

impl MockProvider {
    /// A provider that replays `responses` in order.
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses,
            next: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    /// A provider that always answers with the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![ChatResponse::from_text(text)])
    }

    /// A provider whose every call fails with the given error kind.
    pub fn failing(kind: LlmErrorKind) -> Self {
        Self {
            responses: Vec::new(),
            next: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            fail_with: Some(kind),
        }
    }

    /// How many chat calls have been made.
    pub fn call_count(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }

    /// Snapshot of every request received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(kind) = self.fail_with {
            return Err(LlmError::new(kind, "mock", "scripted failure"));
        }

        self.responses
            .get(index.min(self.responses.len().saturating_sub(1)))
            .cloned()
            .ok_or_else(|| {
                LlmError::new(LlmErrorKind::Internal, "mock", "no scripted responses")
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolCall;

    fn request() -> ChatRequest {
        ChatRequest::new("test-model", vec![crate::message::Message::user("hi")])
    }

    #[tokio::test]
    async fn replays_script_in_order() {
        let provider = MockProvider::new(vec![
            ChatResponse::from_tool_calls(vec![ToolCall::function("c1", "t", "{}")]),
            ChatResponse::from_text("done"),
        ]);

        let first = provider.chat(&request()).await.unwrap();
        assert!(first.tool_calls().is_some());
        let second = provider.chat(&request()).await.unwrap();
        assert_eq!(second.text(), "done");
    }

    #[tokio::test]
    async fn repeats_last_response_when_exhausted() {
        let provider = MockProvider::with_text("again");
        for _ in 0..3 {
            assert_eq!(provider.chat(&request()).await.unwrap().text(), "again");
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn records_requests() {
        let provider = MockProvider::with_text("ok");
        provider.chat(&request()).await.unwrap();
        let recorded = provider.requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].model, "test-model");
    }

    #[tokio::test]
    async fn failing_provider_errors() {
        let provider = MockProvider::failing(LlmErrorKind::Network);
        let err = provider.chat(&request()).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Network);
    }

    #[tokio::test]
    async fn empty_script_is_an_error() {
        let provider = MockProvider::new(vec![]);
        let err = provider.chat(&request()).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Internal);
    }
}
