//! HTTP adapter for a local model server.

use crate::config::{LocalConfig, ProviderKind};
use crate::lines::LineBuffer;
use crate::prompt::{estimate_tokens, flatten_prompt};
use crate::wire::{GenerateBody, GenerateFrame, SamplingOptions, TagsFrame};
use async_stream::stream;
use async_trait::async_trait;
use futures_util::StreamExt;
use genapi::{
    Candidate, Content, ContentGenerator, FinishReason, GenerateError, GenerateRequest,
    GenerateResponse, Part, ResponseStream, Role, UsageStats,
};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, trace};

/// Generation client for a local model server speaking the Ollama API.
///
/// One instance holds an immutable [`LocalConfig`] and a shared HTTP
/// client. Calls are independent: each gets its own deadline, nothing is
/// retried, and dropping a response stream tears down its connection.
pub struct LocalGenerator {
    config: LocalConfig,
    http: reqwest::Client,
}

impl LocalGenerator {
    /// Create a generator for `config`.
    pub fn new(config: LocalConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// The settings this generator was built with.
    pub fn config(&self) -> &LocalConfig {
        &self.config
    }

    /// List the models installed on the server via `/api/tags`.
    pub async fn list_models(&self) -> Result<Vec<String>, GenerateError> {
        self.ensure_supported()?;
        let url = self.url("/api/tags");
        let deadline = self.deadline();
        debug!(endpoint = %self.config.endpoint, "listing models");
        let response = timeout_at(deadline, self.http.get(&url).send())
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.request_error(e))?;
        let response = self.check_status(deadline, response).await?;
        let tags: TagsFrame = timeout_at(deadline, response.json())
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.request_error(e))?;
        Ok(tags.models.into_iter().map(|model| model.name).collect())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn deadline(&self) -> Instant {
        Instant::now() + self.config.timeout()
    }

    fn ensure_supported(&self) -> Result<(), GenerateError> {
        match self.config.provider {
            ProviderKind::Ollama => Ok(()),
            other => Err(GenerateError::UnsupportedProvider {
                provider: other.to_string(),
            }),
        }
    }

    fn timeout_error(&self) -> GenerateError {
        GenerateError::Timeout {
            endpoint: self.config.endpoint.clone(),
            provider: self.config.provider.to_string(),
            seconds: self.config.timeout_secs,
        }
    }

    fn request_error(&self, err: reqwest::Error) -> GenerateError {
        if err.is_timeout() {
            return self.timeout_error();
        }
        GenerateError::Request {
            endpoint: self.config.endpoint.clone(),
            message: err.to_string(),
        }
    }

    /// Turn a non-success response into [`GenerateError::Upstream`],
    /// using the body text as the reason when the server sent one.
    async fn check_status(
        &self,
        deadline: Instant,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerateError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match timeout_at(deadline, response.text()).await {
            Ok(Ok(text)) => text,
            _ => String::new(),
        };
        let reason = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        } else {
            body.trim().to_string()
        };
        Err(GenerateError::Upstream {
            endpoint: self.config.endpoint.clone(),
            status: status.as_u16(),
            reason,
        })
    }

    fn body_for(&self, request: &GenerateRequest, stream: bool) -> GenerateBody {
        GenerateBody {
            model: self.config.model.clone(),
            prompt: flatten_prompt(&request.contents),
            stream,
            options: SamplingOptions::from_options(request.options.as_ref()),
        }
    }
}

fn candidate_from(frame: &GenerateFrame) -> Candidate {
    Candidate {
        content: Content {
            role: Role::Model,
            parts: vec![Part::Text(frame.response.clone())],
        },
        // The server only distinguishes finished from not finished, so a
        // finish reason is reported exactly when `done` is set, on the
        // buffered and streamed paths alike.
        finish_reason: frame.done.then_some(FinishReason::Stop),
        index: 0,
    }
}

/// Map the buffered reply, attaching usage counters.
fn response_from(frame: GenerateFrame) -> GenerateResponse {
    let prompt_tokens = frame.prompt_eval_count.unwrap_or(0);
    let candidate_tokens = frame.eval_count.unwrap_or(0);
    GenerateResponse {
        candidates: vec![candidate_from(&frame)],
        usage: Some(UsageStats {
            prompt_tokens,
            candidate_tokens,
            // Counters come off the wire; a hostile total must clamp, not
            // overflow.
            total_tokens: prompt_tokens.saturating_add(candidate_tokens),
        }),
    }
}

/// Parse one stream line into a chunk.
///
/// Returns `None` for blank lines, for lines that do not parse as JSON
/// (keep-alive noise is skipped rather than failing the stream), and for
/// frames with no text.
fn chunk_from_line(line: &str) -> Option<GenerateResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let frame: GenerateFrame = match serde_json::from_str(line) {
        Ok(frame) => frame,
        Err(err) => {
            trace!(%err, "skipping malformed stream line");
            return None;
        }
    };
    if frame.response.is_empty() {
        return None;
    }
    Some(GenerateResponse {
        candidates: vec![candidate_from(&frame)],
        usage: None,
    })
}

#[async_trait]
impl ContentGenerator for LocalGenerator {
    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, GenerateError> {
        self.ensure_supported()?;
        let body = self.body_for(&request, false);
        let url = self.url("/api/generate");
        let deadline = self.deadline();
        debug!(endpoint = %self.config.endpoint, model = %self.config.model, "buffered generate");
        let response = timeout_at(deadline, self.http.post(&url).json(&body).send())
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.request_error(e))?;
        let response = self.check_status(deadline, response).await?;
        let frame: GenerateFrame = timeout_at(deadline, response.json())
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.request_error(e))?;
        Ok(response_from(frame))
    }

    async fn generate_stream(
        &self,
        request: GenerateRequest,
    ) -> Result<ResponseStream, GenerateError> {
        self.ensure_supported()?;
        let body = self.body_for(&request, true);
        let url = self.url("/api/generate");
        let deadline = self.deadline();
        debug!(endpoint = %self.config.endpoint, model = %self.config.model, "streaming generate");
        let response = timeout_at(deadline, self.http.post(&url).json(&body).send())
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.request_error(e))?;
        let response = self.check_status(deadline, response).await?;

        let endpoint = self.config.endpoint.clone();
        let provider = self.config.provider.to_string();
        let seconds = self.config.timeout_secs;
        let mut bytes = response.bytes_stream();
        let chunks = stream! {
            let mut lines = LineBuffer::new();
            loop {
                let chunk = match timeout_at(deadline, bytes.next()).await {
                    Err(_) => {
                        yield Err(GenerateError::Timeout {
                            endpoint: endpoint.clone(),
                            provider: provider.clone(),
                            seconds,
                        });
                        return;
                    }
                    Ok(None) => break,
                    Ok(Some(Err(err))) => {
                        let mapped = if err.is_timeout() {
                            GenerateError::Timeout {
                                endpoint: endpoint.clone(),
                                provider: provider.clone(),
                                seconds,
                            }
                        } else {
                            GenerateError::Request {
                                endpoint: endpoint.clone(),
                                message: err.to_string(),
                            }
                        };
                        yield Err(mapped);
                        return;
                    }
                    Ok(Some(Ok(chunk))) => chunk,
                };
                for line in lines.push(&chunk) {
                    if let Some(piece) = chunk_from_line(&line) {
                        yield Ok(piece);
                    }
                }
            }
            // The last line is not always newline-terminated.
            if let Some(tail) = lines.finish() {
                if let Some(piece) = chunk_from_line(&tail) {
                    yield Ok(piece);
                }
            }
        };
        Ok(Box::pin(chunks))
    }

    async fn count_tokens(&self, request: &GenerateRequest) -> Result<u32, GenerateError> {
        Ok(estimate_tokens(&request.contents))
    }

    async fn embed(&self, _request: &GenerateRequest) -> Result<Vec<f32>, GenerateError> {
        Err(GenerateError::NotSupported(format!(
            "provider `{}` does not serve embeddings; configure an embedding-capable provider",
            self.config.provider
        )))
    }
}
