use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{GenerationFailure, GenerationProvider, ImageRequest, TextRequest};

/// Scripted provider: returns a fixed text/url, or fails every call.
#[derive(Clone, Default)]
pub struct MockProvider {
    text: Option<String>,
    url: Option<String>,
    failure: Option<String>,
    calls: Arc<Mutex<usize>>,
    last_text: Arc<Mutex<Option<TextRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// Every call fails with an API error whose body is `cause`.
    pub fn failing(mut self, cause: &str) -> Self {
        self.failure = Some(cause.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn last_text_request(&self) -> Option<TextRequest> {
        self.last_text.lock().unwrap().clone()
    }

    fn record_call(&self) -> Result<(), GenerationFailure> {
        *self.calls.lock().unwrap() += 1;
        match &self.failure {
            Some(cause) => Err(GenerationFailure::Api {
                status: 500,
                body: cause.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn generate_text(&self, request: &TextRequest) -> Result<String, GenerationFailure> {
        *self.last_text.lock().unwrap() = Some(request.clone());
        self.record_call()?;
        self.text.clone().ok_or(GenerationFailure::EmptyContent)
    }

    async fn generate_image(&self, _request: &ImageRequest) -> Result<String, GenerationFailure> {
        self.record_call()?;
        self.url.clone().ok_or(GenerationFailure::MissingImageUrl)
    }
}
