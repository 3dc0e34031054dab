pub mod schemas;

use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::debug;
use rr_core::{JobId, JobSnapshot};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::generator::backend::schemas::{ApiEnvelope, ErrorBody, StoryAccepted, StoryRequest};

/// Calls the generator makes against the story service.
#[async_trait]
pub trait StoryApi: Send + Sync {
    async fn create_story(&self, request: &StoryRequest) -> Result<StoryAccepted, ApiError>;

    async fn job_status(&self, job_id: &JobId) -> Result<JobSnapshot, ApiError>;

    async fn list_music(&self) -> Result<Vec<String>, ApiError>;

    async fn list_backgrounds(&self) -> Result<Vec<String>, ApiError>;

    /// Locator of the finished video, without any cache-busting token.
    fn video_url(&self, job_id: &JobId) -> String;
}

/// HTTP client for the story service REST API.
pub struct GenBackend {
    client: reqwest::Client,
    base_url: String,
}

impl GenBackend {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    async fn get_list(&self, path: &str) -> Result<Vec<String>, ApiError> {
        let response = self.client.get(self.endpoint(path)).send().await?;
        read_envelope(response).await?.into_data(true)
    }
}

#[async_trait]
impl StoryApi for GenBackend {
    async fn create_story(&self, request: &StoryRequest) -> Result<StoryAccepted, ApiError> {
        let response = self
            .client
            .post(self.endpoint("stories"))
            .json(request)
            .send()
            .await?;

        let accepted: StoryAccepted = read_envelope(response).await?.into_data(true)?;
        debug!(job_id = %accepted.job_id, status = %accepted.status, "story accepted");
        Ok(accepted)
    }

    async fn job_status(&self, job_id: &JobId) -> Result<JobSnapshot, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&format!("stories/{job_id}")))
            .send()
            .await?;

        read_envelope(response).await?.into_data(false)
    }

    async fn list_music(&self) -> Result<Vec<String>, ApiError> {
        self.get_list("music").await
    }

    async fn list_backgrounds(&self) -> Result<Vec<String>, ApiError> {
        self.get_list("videos/backgrounds").await
    }

    fn video_url(&self, job_id: &JobId) -> String {
        self.endpoint(&format!("videos/{job_id}"))
    }
}

/// Turns non-2xx answers into `ApiError::Rejected`, preferring the
/// service's own `error` text over the bare status code.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<ApiEnvelope<T>, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| format!("API request failed with status: {}", status.as_u16()));
        return Err(ApiError::rejected(Some(status.as_u16()), message));
    }

    response
        .json::<ApiEnvelope<T>>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
