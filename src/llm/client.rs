use super::error::RemoteServiceError;
use super::types::InferenceRequest;
use async_trait::async_trait;

/// A remote inference capability: given text and/or an image, return raw
/// assistant text. Implementations make exactly one outbound call per invoke
/// and never retry; retry policy belongs to the caller.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn invoke(&self, request: InferenceRequest) -> Result<String, RemoteServiceError>;

    fn name(&self) -> &str;

    fn model_info(&self) -> Option<String> {
        None
    }
}
