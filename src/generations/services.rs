use tracing::{info, warn};

use crate::error::ApiError;
use crate::provider::{ImageRequest, TextRequest};
use crate::state::AppState;
use crate::store::{GenerationKind, Metadata, NewGeneration};

fn collect_options(pairs: [(&str, &Option<String>); 3]) -> Metadata {
    pairs
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())))
        .collect()
}

pub(crate) fn text_metadata(request: &TextRequest) -> Metadata {
    collect_options([
        ("contentType", &request.content_type),
        ("tone", &request.tone),
        ("length", &request.length),
    ])
}

pub(crate) fn image_metadata(request: &ImageRequest) -> Metadata {
    collect_options([
        ("style", &request.style),
        ("aspectRatio", &request.aspect_ratio),
        ("quality", &request.quality),
    ])
}

/// Calls the provider, then records the exchange. A provider failure leaves
/// the store untouched.
pub async fn generate_text(state: &AppState, request: TextRequest) -> Result<String, ApiError> {
    let text = state.provider.generate_text(&request).await.map_err(|e| {
        warn!(error = %e, "text generation failed");
        ApiError::generation(GenerationKind::Text, e)
    })?;

    let record = state.store.create_generation(NewGeneration {
        user_id: None,
        kind: GenerationKind::Text,
        metadata: Some(text_metadata(&request)),
        prompt: request.prompt,
        result: text.clone(),
    })?;

    info!(generation_id = %record.id, chars = text.len(), "text generated");
    Ok(text)
}

pub async fn generate_image(state: &AppState, request: ImageRequest) -> Result<String, ApiError> {
    let url = state.provider.generate_image(&request).await.map_err(|e| {
        warn!(error = %e, "image generation failed");
        ApiError::generation(GenerationKind::Image, e)
    })?;

    let record = state.store.create_generation(NewGeneration {
        user_id: None,
        kind: GenerationKind::Image,
        metadata: Some(image_metadata(&request)),
        prompt: request.prompt,
        result: url.clone(),
    })?;

    info!(generation_id = %record.id, "image generated");
    Ok(url)
}
