use async_trait::async_trait;
use serde_json::Value;

use crate::backend::Backend;
use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::protocol::ApiRequest;

/// Backend reached over HTTP(S), e.g. an Apps Script web app
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: BackendConfig,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, ApiError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.timeout);
        let client = builder.build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let Some(url) = self.config.endpoint() else {
            tracing::warn!(action = request.action.as_str(), "backend not configured");
            return Err(ApiError::NotConfigured);
        };

        tracing::debug!(action = request.action.as_str(), "sending backend request");

        let builder = match &request.body {
            Some(body) => self.client.post(url).json(body),
            None => self.client.get(url).query(&request.query_pairs()),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::error!(action = request.action.as_str(), "request failed: {}", e);
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                action = request.action.as_str(),
                status = status.as_u16(),
                "backend returned an error status"
            );
            return Err(ApiError::from_status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        Ok(body)
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}
