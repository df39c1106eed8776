//! Remote inference clients and request types

pub mod client;
pub mod error;
pub mod mock;
pub mod openrouter;
pub mod types;

pub use client::InferenceClient;
pub use error::RemoteServiceError;
pub use mock::{MockInferenceClient, MockResponse};
pub use openrouter::OpenRouterClient;
pub use types::{ContentPart, InferenceRequest};
