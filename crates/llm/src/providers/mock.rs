//! Deterministic mock LLM provider.
//!
//! Answers come from a queue of scripted responses, falling back to a
//! responder function. Every request is recorded so tests can assert on the
//! prompts the engine sent.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use bulletin_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Responder = Arc<dyn Fn(&LlmRequest) -> String + Send + Sync>;

/// Scripted generation client.
#[derive(Clone)]
pub struct MockClient {
    responses: Arc<Mutex<VecDeque<AppResult<String>>>>,
    responder: Responder,
    requests: Arc<Mutex<Vec<LlmRequest>>>,
    fail: bool,
}

impl std::fmt::Debug for MockClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockClient")
            .field("fail", &self.fail)
            .finish_non_exhaustive()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::with_responder(|_| "mock response".to_string())
    }
}

impl MockClient {
    /// Client that answers every request with `responder(request)`.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&LlmRequest) -> String + Send + Sync + 'static,
    {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Client that replays `responses` in order, then falls back to the
    /// default responder.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::default();
        {
            let mut queue = client.queue();
            queue.extend(responses.into_iter().map(|r| Ok(r.into())));
        }
        client
    }

    /// Client whose every call fails with a generation error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Queue a failure for the next unanswered call.
    pub fn push_error(&self, message: impl Into<String>) {
        self.queue().push_back(Err(AppError::Llm(message.into())));
    }

    /// Queue a response for the next unanswered call.
    pub fn push_response(&self, response: impl Into<String>) {
        self.queue().push_back(Ok(response.into()));
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn queue(&self) -> std::sync::MutexGuard<'_, VecDeque<AppResult<String>>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Responder that answers with the first paragraph of the context block
    /// in an answer prompt, or with the prompt itself otherwise.
    ///
    /// Useful for offline runs: the answer is always drawn from retrieved text.
    pub fn echo_context() -> Self {
        Self::with_responder(|request| {
            request
                .prompt
                .split_once("Context:\n")
                .map(|(_, rest)| rest)
                .and_then(|rest| rest.split("\n\n").next())
                .unwrap_or(&request.prompt)
                .trim()
                .to_string()
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        if self.fail {
            return Err(AppError::Llm("mock LLM error".to_string()));
        }

        let scripted = self.queue().pop_front();
        let content = match scripted {
            Some(result) => result?,
            None => (self.responder)(request),
        };

        let usage = LlmUsage::new(
            request.prompt.split_whitespace().count() as u32,
            content.split_whitespace().count() as u32,
        );

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage,
            done: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_then_default() {
        let client = MockClient::with_responses(["first", "second"]);
        let request = LlmRequest::new("q", "mock");

        assert_eq!(client.complete(&request).await.unwrap().content, "first");
        assert_eq!(client.complete(&request).await.unwrap().content, "second");
        assert_eq!(
            client.complete(&request).await.unwrap().content,
            "mock response"
        );
        assert_eq!(client.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_failing_client() {
        let client = MockClient::failing();
        let result = client.complete(&LlmRequest::new("q", "mock")).await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[tokio::test]
    async fn test_queued_error() {
        let client = MockClient::default();
        client.push_error("quota exceeded");
        client.push_response("recovered");

        let request = LlmRequest::new("q", "mock");
        assert!(client.complete(&request).await.is_err());
        assert_eq!(client.complete(&request).await.unwrap().content, "recovered");
    }

    #[tokio::test]
    async fn test_echo_context() {
        let client = MockClient::echo_context();
        let request = LlmRequest::new(
            "Context:\nFood Drive\nDrop off cans Saturday.\n\nLost Cat\n\nQuestion:\nWhen?",
            "mock",
        );

        let response = client.complete(&request).await.unwrap();
        assert_eq!(response.content, "Food Drive\nDrop off cans Saturday.");
    }

    #[tokio::test]
    async fn test_requests_are_recorded() {
        let client = MockClient::default();
        let request = LlmRequest::new("question", "mock").with_system("instruction");
        client.complete(&request).await.unwrap();

        let seen = client.requests();
        assert_eq!(seen[0].system.as_deref(), Some("instruction"));
        assert_eq!(seen[0].prompt, "question");
    }
}
