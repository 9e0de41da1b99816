//! Local generation adapter.
//!
//! [`LocalGenerator`] implements [`genapi::ContentGenerator`] against a
//! local model server speaking the Ollama HTTP API: buffered and streamed
//! text generation plus a cheap offline token estimate. Other providers
//! named in [`ProviderKind`] are accepted in configuration but refused at
//! call time, so pointing the adapter at them fails fast instead of
//! sending a request the server cannot answer.

pub mod client;
pub mod config;
pub mod lines;
pub mod prompt;
pub mod wire;

pub use client::LocalGenerator;
pub use config::{LocalConfig, ProviderKind};
