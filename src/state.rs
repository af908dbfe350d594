use crate::config::AppConfig;
use crate::provider::{GenerationProvider, OpenAiProvider};
use crate::store::{GenerationStore, MemStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn GenerationStore>,
    pub provider: Arc<dyn GenerationProvider>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        if config.provider.api_key.is_empty() {
            tracing::warn!("OPENAI_API_KEY is not set; generation requests will fail");
        }

        let provider =
            Arc::new(OpenAiProvider::new(&config.provider)?) as Arc<dyn GenerationProvider>;
        let store = Arc::new(MemStore::new()) as Arc<dyn GenerationStore>;

        Ok(Self::from_parts(config, store, provider))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn GenerationStore>,
        provider: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            config,
            store,
            provider,
        }
    }

    /// State backed by a fresh `MemStore` and the given provider.
    #[cfg(test)]
    pub fn fake(provider: Arc<dyn GenerationProvider>) -> Self {
        use crate::config::ProviderConfig;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            provider: ProviderConfig {
                api_key: "test".into(),
                base_url: "http://fake.local".into(),
                text_model: "test-text".into(),
                image_model: "test-image".into(),
                timeout_secs: 1,
            },
        });

        Self::from_parts(config, Arc::new(MemStore::new()), provider)
    }
}
