//! The [`ContentGenerator`] trait and its error type.

use crate::types::{GenerateRequest, GenerateResponse};
use async_trait::async_trait;
use futures_core::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Errors surfaced by a [`ContentGenerator`].
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The configured provider has no implementation behind this generator.
    #[error("provider `{provider}` is not supported by this generator")]
    UnsupportedProvider { provider: String },
    /// No response arrived within the configured deadline.
    #[error("request to {endpoint} ({provider}) timed out after {seconds}s")]
    Timeout {
        endpoint: String,
        provider: String,
        seconds: u64,
    },
    /// The server answered with a non-success status.
    #[error("server at {endpoint} returned {status}: {reason}")]
    Upstream {
        endpoint: String,
        status: u16,
        reason: String,
    },
    /// Transport or decoding failure other than a timeout.
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },
    /// The operation is not offered by this generator.
    #[error("{0}")]
    NotSupported(String),
}

/// Stream of partial responses from [`ContentGenerator::generate_stream`].
///
/// The stream is finite and one-shot; collecting the text of every chunk
/// reconstructs the full reply.
pub type ResponseStream =
    Pin<Box<dyn Stream<Item = Result<GenerateResponse, GenerateError>> + Send>>;

/// Interface for producing generated content from a model backend.
///
/// Implementations translate the neutral request and response shapes to
/// one concrete provider; callers depend only on this trait.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate a complete response in one round trip.
    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, GenerateError>;

    /// Generate a response as a lazy sequence of chunks.
    async fn generate_stream(
        &self,
        request: GenerateRequest,
    ) -> Result<ResponseStream, GenerateError>;

    /// Estimate how many tokens the request's text would consume.
    async fn count_tokens(&self, request: &GenerateRequest) -> Result<u32, GenerateError>;

    /// Produce an embedding vector for the request's text.
    async fn embed(&self, request: &GenerateRequest) -> Result<Vec<f32>, GenerateError>;
}

/// Scripted generator for tests.
///
/// `generate` replays the first scripted response; `generate_stream`
/// yields all of them in order.
pub struct MockGenerator {
    pub responses: Vec<GenerateResponse>,
    pub token_count: u32,
}

impl MockGenerator {
    pub fn new(responses: Vec<GenerateResponse>, token_count: u32) -> Self {
        Self {
            responses,
            token_count,
        }
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn generate(
        &self,
        _request: GenerateRequest,
    ) -> Result<GenerateResponse, GenerateError> {
        self.responses
            .first()
            .cloned()
            .ok_or_else(|| GenerateError::Request {
                endpoint: "mock".to_string(),
                message: "no scripted response".to_string(),
            })
    }

    async fn generate_stream(
        &self,
        _request: GenerateRequest,
    ) -> Result<ResponseStream, GenerateError> {
        let scripted = self.responses.clone().into_iter().map(Ok);
        Ok(Box::pin(tokio_stream::iter(scripted)))
    }

    async fn count_tokens(&self, _request: &GenerateRequest) -> Result<u32, GenerateError> {
        Ok(self.token_count)
    }

    async fn embed(&self, _request: &GenerateRequest) -> Result<Vec<f32>, GenerateError> {
        Err(GenerateError::NotSupported(
            "mock generator does not produce embeddings".to_string(),
        ))
    }
}
