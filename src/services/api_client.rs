use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, error};

use crate::errors::{AppError, AppResult};
use crate::models::{ApiTrainData, ApiWorksData};
use crate::tools::i18n::Language;

#[async_trait]
pub trait DelayMapApi: Send + Sync {
    async fn fetch_trains(&self, language: Language) -> AppResult<ApiTrainData>;
    async fn fetch_works(&self, language: Language) -> AppResult<ApiWorksData>;
}

pub struct HttpDelayMapApi {
    base_url: Url,
    http_client: reqwest::Client,
}

impl HttpDelayMapApi {
    pub fn new(base_url: Url, request_timeout: Duration) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn fetch_json<T>(&self, path: &str, language: Language) -> AppResult<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let url = self.endpoint(path);
        debug!("Fetching {} (language={})", url, language);

        let response = self
            .http_client
            .get(&url)
            .query(&[("language", language.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("HTTP request to {} failed with status {}: {}", url, status, body);
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl DelayMapApi for HttpDelayMapApi {
    async fn fetch_trains(&self, language: Language) -> AppResult<ApiTrainData> {
        self.fetch_json("trains", language).await
    }

    async fn fetch_works(&self, language: Language) -> AppResult<ApiWorksData> {
        self.fetch_json("works", language).await
    }
}
