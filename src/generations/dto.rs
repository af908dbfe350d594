use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::provider::{ImageRequest, TextRequest};
use crate::store::GenerationRecord;

/// Optional option field: may be omitted, but `null` is not a string.
fn present_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    String::deserialize(d).map(Some)
}

/// Body of `POST /api/ai/text`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextGenerationPayload {
    pub prompt: String,
    #[serde(default, deserialize_with = "present_string")]
    pub content_type: Option<String>,
    #[serde(default, deserialize_with = "present_string")]
    pub tone: Option<String>,
    #[serde(default, deserialize_with = "present_string")]
    pub length: Option<String>,
}

/// Body of `POST /api/ai/image`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationPayload {
    pub prompt: String,
    #[serde(default, deserialize_with = "present_string")]
    pub style: Option<String>,
    #[serde(default, deserialize_with = "present_string")]
    pub aspect_ratio: Option<String>,
    #[serde(default, deserialize_with = "present_string")]
    pub quality: Option<String>,
}

fn require_prompt(prompt: &str) -> Result<(), ApiError> {
    if prompt.is_empty() {
        return Err(ApiError::Validation("Prompt is required".into()));
    }
    Ok(())
}

impl TryFrom<TextGenerationPayload> for TextRequest {
    type Error = ApiError;

    fn try_from(p: TextGenerationPayload) -> Result<Self, Self::Error> {
        require_prompt(&p.prompt)?;
        Ok(TextRequest {
            prompt: p.prompt,
            content_type: p.content_type,
            tone: p.tone,
            length: p.length,
        })
    }
}

impl TryFrom<ImageGenerationPayload> for ImageRequest {
    type Error = ApiError;

    fn try_from(p: ImageGenerationPayload) -> Result<Self, Self::Error> {
        require_prompt(&p.prompt)?;
        Ok(ImageRequest {
            prompt: p.prompt,
            style: p.style,
            aspect_ratio: p.aspect_ratio,
            quality: p.quality,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TextGenerationResponse {
    pub success: bool,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ImageGenerationResponse {
    pub success: bool,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user_id: Option<String>,
}

impl HistoryQuery {
    /// Unparseable ids are treated like a missing owner.
    pub fn owner(&self) -> Option<Uuid> {
        self.user_id.as_deref().and_then(|s| Uuid::parse_str(s).ok())
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub generations: Vec<GenerationRecord>,
}
