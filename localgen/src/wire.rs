//! Bodies for the Ollama HTTP API.
//!
//! `/api/generate` takes `{model, prompt, stream, options}` and answers
//! with a single JSON object when `stream` is false, or newline-delimited
//! objects when it is true. Every reply object carries the generated
//! `response` text and a `done` flag; the final one adds token counts.
//! Absent fields deserialize to defaults so partial frames still parse.
//! `/api/tags` lists the models installed on the server.

use genapi::GenerateOptions;
use serde::{Deserialize, Serialize};

/// Body POSTed to `/api/generate`.
#[derive(Clone, Debug, Serialize)]
pub struct GenerateBody {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: SamplingOptions,
}

/// Sampling knobs forwarded to the server, always serialized in full.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SamplingOptions {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
        }
    }
}

impl SamplingOptions {
    /// Lay the caller's options over the defaults.
    pub fn from_options(options: Option<&GenerateOptions>) -> Self {
        let mut merged = Self::default();
        if let Some(options) = options {
            if let Some(temperature) = options.temperature {
                merged.temperature = temperature;
            }
            if let Some(top_p) = options.top_p {
                merged.top_p = top_p;
            }
            if let Some(top_k) = options.top_k {
                merged.top_k = top_k;
            }
        }
        merged
    }
}

/// One `/api/generate` reply object: the whole body when buffered, a
/// single newline-delimited line when streamed.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GenerateFrame {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

/// `/api/tags` reply body.
#[derive(Debug, Deserialize)]
pub struct TagsFrame {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// One installed model listed by `/api/tags`.
#[derive(Debug, Deserialize)]
pub struct ModelTag {
    pub name: String,
}
