use super::client::InferenceClient;
use super::error::RemoteServiceError;
use super::types::InferenceRequest;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted inference client for tests.
///
/// Responses are consumed in order, one per `invoke`. Every request handed to
/// the client is recorded so tests can assert how many stages actually ran and
/// what each was asked.
pub struct MockInferenceClient {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<InferenceRequest>>,
}

#[derive(Debug, Clone)]
pub enum MockResponse {
    Text(String),
    Error(RemoteServiceError),
}

impl MockResponse {
    pub fn text(content: impl Into<String>) -> Self {
        MockResponse::Text(content.into())
    }

    pub fn error(error: RemoteServiceError) -> Self {
        MockResponse::Error(error)
    }
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn add_response(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        let mut queue = self.responses.lock().unwrap();
        for response in responses {
            queue.push_back(response);
        }
    }

    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    /// Number of invocations made against this client
    pub fn invocation_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Copy of the request submitted by invocation `index`
    pub fn request_at(&self, index: usize) -> Option<InferenceRequest> {
        self.requests.lock().unwrap().get(index).cloned()
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn invoke(&self, request: InferenceRequest) -> Result<String, RemoteServiceError> {
        self.requests.lock().unwrap().push(request);

        let response = self.responses.lock().unwrap().pop_front().ok_or_else(|| {
            RemoteServiceError::InvalidResponse(
                "MockInferenceClient: no more responses in queue".to_string(),
            )
        })?;

        match response {
            MockResponse::Text(content) => Ok(content),
            MockResponse::Error(error) => Err(error),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model_info(&self) -> Option<String> {
        Some("mock-model".to_string())
    }
}

impl std::fmt::Debug for MockInferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockInferenceClient")
            .field("remaining_responses", &self.remaining_responses())
            .field("invocation_count", &self.invocation_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_basic() {
        let client = MockInferenceClient::new();
        client.add_response(MockResponse::text("{\"ok\": true}"));

        let raw = client
            .invoke(InferenceRequest::text("prompt", 100))
            .await
            .unwrap();

        assert_eq!(raw, "{\"ok\": true}");
        assert_eq!(client.invocation_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let client = MockInferenceClient::new();
        client.add_response(MockResponse::error(RemoteServiceError::Timeout {
            seconds: 30,
        }));

        let result = client.invoke(InferenceRequest::text("prompt", 100)).await;

        assert!(matches!(result, Err(RemoteServiceError::Timeout { .. })));
        // failed invocations still count
        assert_eq!(client.invocation_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_client_no_responses() {
        let client = MockInferenceClient::new();

        let result = client.invoke(InferenceRequest::text("prompt", 100)).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_client_records_requests() {
        let client = MockInferenceClient::new();
        client.add_responses(vec![
            MockResponse::text("first"),
            MockResponse::text("second"),
        ]);

        client
            .invoke(InferenceRequest::text("with image", 300).with_image("image/jpeg", "Zm9v"))
            .await
            .unwrap();
        client
            .invoke(InferenceRequest::text("text only", 800))
            .await
            .unwrap();

        assert_eq!(client.invocation_count(), 2);
        assert!(client.request_at(0).unwrap().has_image());
        assert!(!client.request_at(1).unwrap().has_image());
        assert_eq!(client.remaining_responses(), 0);
    }
}
