use serde::{Deserialize, Serialize};
use rr_core::{JobId, JobStatus, Style, StoryOptions};
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoryRequest {
    pub text: String,
    pub duration: u32,
    pub style: Style,
    pub music: String,
    pub video: String,
}

impl StoryRequest {
    pub fn new(text: &str, options: &StoryOptions) -> Self {
        Self {
            text: text.to_string(),
            duration: options.duration,
            style: options.style,
            music: options.music.clone(),
            video: options.video.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoryAccepted {
    pub job_id: JobId,
    #[serde(default)]
    pub rot_output: String,
    pub status: JobStatus,
}

/// `{success, data, error}` wrapper used by every JSON endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps `data`. With `require_success` the body must say
    /// `success: true`; otherwise only an explicit `success: false` fails.
    pub fn into_data(self, require_success: bool) -> Result<T, ApiError> {
        let accepted = match self.success {
            Some(success) => success,
            None => !require_success,
        };
        if !accepted {
            let message = self.error.unwrap_or_else(|| "Request was not successful".to_string());
            return Err(ApiError::rejected(None, message));
        }
        self.data
            .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
