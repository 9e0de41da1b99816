//! Request and response shapes shared by every generator.

use serde::{Deserialize, Serialize};

/// Speaker role attached to a content entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One piece of a content entry.
///
/// Generation adapters consume [`Part::Text`]; [`Part::Data`] carries
/// binary payloads as base64 so multimodal entries survive the trip even
/// when an adapter ignores them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Text(String),
    Data { mime: String, base64: String },
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// The text payload, if this is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Data { .. } => None,
        }
    }
}

/// A role-tagged list of parts forming one conversational turn.
///
/// ```
/// use genapi::{Content, Role};
///
/// let entry = Content::user("hi there");
/// assert_eq!(entry.role, Role::User);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn holding a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// A model turn holding a single text part.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }
}

/// Accepted shapes for the content of a [`GenerateRequest`].
///
/// Callers may hand over a bare string, a loose list of parts, one entry,
/// or a full entry list. [`ContentInput::into_entries`] is the single
/// place the union is normalized; adapters never inspect the shape
/// themselves.
///
/// ```
/// use genapi::{ContentInput, Role};
///
/// let entries = ContentInput::Text("hello".into()).into_entries();
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].role, Role::User);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentInput {
    Text(String),
    Parts(Vec<Part>),
    Entry(Content),
    Entries(Vec<Content>),
}

impl ContentInput {
    /// Normalize to an ordered sequence of content entries.
    ///
    /// Bare text and loose parts become a single user entry.
    pub fn into_entries(self) -> Vec<Content> {
        match self {
            Self::Text(text) => vec![Content {
                role: Role::User,
                parts: vec![Part::Text(text)],
            }],
            Self::Parts(parts) => vec![Content {
                role: Role::User,
                parts,
            }],
            Self::Entry(entry) => vec![entry],
            Self::Entries(entries) => entries,
        }
    }

    /// Collect every text payload in entry order, skipping non-text parts.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => vec![text.as_str()],
            Self::Parts(parts) => parts.iter().filter_map(Part::as_text).collect(),
            Self::Entry(entry) => entry.parts.iter().filter_map(Part::as_text).collect(),
            Self::Entries(entries) => entries
                .iter()
                .flat_map(|entry| entry.parts.iter())
                .filter_map(Part::as_text)
                .collect(),
        }
    }
}

impl From<&str> for ContentInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ContentInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Sampling knobs carried by a request. Unset fields fall back to whatever
/// the adapter's provider defaults are.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

/// A generation request in the provider-neutral shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub contents: ContentInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

impl GenerateRequest {
    /// A request for a single user turn of plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            contents: ContentInput::Text(text.into()),
            options: None,
        }
    }

    /// Attach sampling options.
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Why generation stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// The model reached a natural end of output.
    Stop,
    /// Output was cut off by a length limit.
    MaxTokens,
}

/// Token accounting attached to a buffered response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub prompt_tokens: u32,
    pub candidate_tokens: u32,
    pub total_tokens: u32,
}

/// One generated alternative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Content,
    /// `None` while generation is still in flight, e.g. on stream chunks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    pub index: u32,
}

/// A generation response: candidates plus optional usage counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageStats>,
}

impl GenerateResponse {
    /// The first text part of the first candidate, if any.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.parts.iter().find_map(Part::as_text))
    }
}
