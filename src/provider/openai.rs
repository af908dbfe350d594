use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use super::openai_types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ImageGenerationRequest,
    ImageGenerationResponse,
};
use super::{GenerationFailure, GenerationProvider, ImageRequest, TextRequest};
use crate::config::ProviderConfig;

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl OpenAiProvider {
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build provider http client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp, GenerationFailure> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, %url, "provider request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, %body, "provider returned error status");
            return Err(GenerationFailure::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, %body, "provider response did not parse");
            GenerationFailure::Decode(e.to_string())
        })
    }
}

/// Provider quality parameter; only `hd` is passed through.
fn image_quality(requested: &str) -> &'static str {
    if requested.eq_ignore_ascii_case("hd") {
        "hd"
    } else {
        "standard"
    }
}

/// Output resolution for the requested aspect ratio.
fn image_size(aspect_ratio: Option<&str>) -> &'static str {
    match aspect_ratio {
        Some(r) if r.contains("16:9") => "1792x1024",
        Some(r) if r.contains("9:16") => "1024x1792",
        _ => "1024x1024",
    }
}

fn image_prompt(request: &ImageRequest) -> String {
    match request.style.as_deref() {
        Some(style) if !style.is_empty() => format!("{}. Style: {}", request.prompt, style),
        _ => request.prompt.clone(),
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    async fn generate_text(&self, request: &TextRequest) -> Result<String, GenerationFailure> {
        let budget = request.budget();
        debug!(model = %self.text_model, ?budget, "requesting text completion");

        let body = ChatCompletionRequest {
            model: self.text_model.clone(),
            messages: vec![
                ChatMessage::new("system", request.directive()),
                ChatMessage::new("user", request.prompt.clone()),
            ],
            max_completion_tokens: budget.max_tokens(),
        };

        let response: ChatCompletionResponse = self.post("/v1/chat/completions", &body).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerationFailure::EmptyContent)
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<String, GenerationFailure> {
        let body = ImageGenerationRequest {
            model: self.image_model.clone(),
            prompt: image_prompt(request),
            n: 1,
            size: image_size(request.aspect_ratio.as_deref()).to_string(),
            quality: image_quality(request.quality()).to_string(),
        };
        debug!(model = %body.model, size = %body.size, quality = %body.quality, "requesting image");

        let response: ImageGenerationResponse =
            self.post("/v1/images/generations", &body).await?;

        response
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .filter(|url| !url.is_empty())
            .ok_or(GenerationFailure::MissingImageUrl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new(&ProviderConfig {
            api_key: "test-key".into(),
            base_url: server.uri(),
            text_model: "gpt-test".into(),
            image_model: "image-test".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn text_request(length: Option<&str>) -> TextRequest {
        TextRequest {
            prompt: "hello".into(),
            length: length.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn quality_maps_to_provider_values() {
        assert_eq!(image_quality("HD"), "hd");
        assert_eq!(image_quality("hd"), "hd");
        assert_eq!(image_quality("Standard"), "standard");
        assert_eq!(image_quality("ultra"), "standard");
    }

    #[test]
    fn aspect_ratio_maps_to_size() {
        assert_eq!(image_size(Some("Landscape (16:9)")), "1792x1024");
        assert_eq!(image_size(Some("9:16")), "1024x1792");
        assert_eq!(image_size(Some("Square (1:1)")), "1024x1024");
        assert_eq!(image_size(None), "1024x1024");
    }

    #[tokio::test]
    async fn text_sends_directive_prompt_and_budget() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gpt-test",
                "max_completion_tokens": 800
            })))
            .and(body_string_contains(r#"{"role":"user","content":"hello"}"#))
            .and(body_string_contains("Generate long general content with a professional tone"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "Hi there" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider(&server)
            .generate_text(&text_request(Some("long")))
            .await
            .unwrap();
        assert_eq!(text, "Hi there");
    }

    #[tokio::test]
    async fn text_without_content_is_a_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "   " } }]
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate_text(&text_request(None))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationFailure::EmptyContent));
    }

    #[tokio::test]
    async fn api_error_carries_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate_text(&text_request(Some("short")))
            .await
            .unwrap_err();
        match &err {
            GenerationFailure::Api { status, body } => {
                assert_eq!(*status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected failure: {other:?}"),
        }
        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate_text(&text_request(None))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationFailure::Decode(_)));
    }

    #[tokio::test]
    async fn image_requests_one_image_with_mapped_options() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(body_partial_json(json!({
                "model": "image-test",
                "prompt": "a cat. Style: Cartoon",
                "n": 1,
                "size": "1792x1024",
                "quality": "hd"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "url": "https://img.example/cat.png" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = provider(&server)
            .generate_image(&ImageRequest {
                prompt: "a cat".into(),
                style: Some("Cartoon".into()),
                aspect_ratio: Some("Landscape (16:9)".into()),
                quality: Some("HD".into()),
            })
            .await
            .unwrap();
        assert_eq!(url, "https://img.example/cat.png");
    }

    #[tokio::test]
    async fn image_without_url_is_a_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(body_partial_json(json!({ "quality": "standard", "size": "1024x1024" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate_image(&ImageRequest {
                prompt: "a cat".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationFailure::MissingImageUrl));
    }
}
