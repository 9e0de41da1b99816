//! Generic content-generation interface.
//!
//! This crate defines the provider-neutral request and response model for
//! text generation plus the [`ContentGenerator`] trait that adapter crates
//! implement. A scripted [`MockGenerator`] is included so downstream code
//! can be tested without a model server.

pub mod generator;
pub mod types;

pub use generator::{ContentGenerator, GenerateError, MockGenerator, ResponseStream};
pub use types::{
    Candidate, Content, ContentInput, FinishReason, GenerateOptions, GenerateRequest,
    GenerateResponse, Part, Role, UsageStats,
};
