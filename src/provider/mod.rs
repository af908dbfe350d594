//! Adapter over the external generative AI provider.
//!
//! The rest of the service only sees [`GenerationProvider`]: one text call and
//! one image call, each a single outbound request with no retries.

#[cfg(test)]
pub mod mock;
pub mod openai;
mod openai_types;

pub use openai::OpenAiProvider;

use async_trait::async_trait;
use thiserror::Error;

pub const DEFAULT_CONTENT_TYPE: &str = "general";
pub const DEFAULT_TONE: &str = "professional";
pub const DEFAULT_LENGTH: &str = "medium";
pub const DEFAULT_QUALITY: &str = "standard";

/// Why a provider call produced nothing usable. `Display` is the cause string
/// reported back to clients.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("could not parse provider response: {0}")]
    Decode(String),
    #[error("provider returned no content")]
    EmptyContent,
    #[error("provider returned no image URL")]
    MissingImageUrl,
}

#[derive(Debug, Clone, Default)]
pub struct TextRequest {
    pub prompt: String,
    pub content_type: Option<String>,
    pub tone: Option<String>,
    pub length: Option<String>,
}

impl TextRequest {
    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    pub fn tone(&self) -> &str {
        self.tone.as_deref().unwrap_or(DEFAULT_TONE)
    }

    pub fn length(&self) -> &str {
        self.length.as_deref().unwrap_or(DEFAULT_LENGTH)
    }

    pub fn budget(&self) -> BudgetTier {
        BudgetTier::for_length(self.length())
    }

    /// System directive combining content type, tone and length.
    pub fn directive(&self) -> String {
        format!(
            "You are an expert content creator. Generate {} {} content with a {} tone. \
             Provide high-quality, engaging content that matches the user's requirements exactly.",
            self.length(),
            self.content_type(),
            self.tone()
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageRequest {
    pub prompt: String,
    pub style: Option<String>,
    pub aspect_ratio: Option<String>,
    pub quality: Option<String>,
}

impl ImageRequest {
    pub fn quality(&self) -> &str {
        self.quality.as_deref().unwrap_or(DEFAULT_QUALITY)
    }
}

/// Completion budget tier selected from the requested length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetTier {
    Small,
    Medium,
    Large,
}

impl BudgetTier {
    /// `short` and `long` select the outer tiers; anything else is medium.
    pub fn for_length(length: &str) -> Self {
        match length {
            "short" => BudgetTier::Small,
            "long" => BudgetTier::Large,
            _ => BudgetTier::Medium,
        }
    }

    pub fn max_tokens(self) -> u32 {
        match self {
            BudgetTier::Small => 200,
            BudgetTier::Medium => 400,
            BudgetTier::Large => 800,
        }
    }
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate_text(&self, request: &TextRequest) -> Result<String, GenerationFailure>;

    /// Returns the location of exactly one generated image.
    async fn generate_image(&self, request: &ImageRequest) -> Result<String, GenerationFailure>;
}
