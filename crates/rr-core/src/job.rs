use std::fmt;
use serde::{Deserialize, Serialize};

/// Opaque job identifier handed out by the story service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Overall job status as reported by the story service.
///
/// Values the client does not know are kept verbatim in `Other` so they can
/// still be shown to the user. They are never terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    ProcessingImages,
    ProcessingVideo,
    Completed,
    CompletedWithErrors,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ProcessingImages => "processing_images",
            Self::ProcessingVideo => "processing_video",
            Self::Completed => "completed",
            Self::CompletedWithErrors => "completed_with_errors",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::CompletedWithErrors | Self::Failed)
    }

    /// Terminal and a video should exist.
    pub fn has_video(&self) -> bool {
        matches!(self, Self::Completed | Self::CompletedWithErrors)
    }
}

impl From<&str> for JobStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "processing_images" => Self::ProcessingImages,
            "processing_video" => Self::ProcessingVideo,
            "completed" => Self::Completed,
            "completed_with_errors" => Self::CompletedWithErrors,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of one pipeline stage (image generation or video editing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StageStatus {
    Processing,
    Completed,
    Timeout,
    Failed,
    Other(String),
}

impl StageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Timeout => "timeout",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for StageStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "timeout" => Self::Timeout,
            "failed" => Self::Failed,
            _ => Self::Other(raw),
        }
    }
}

impl From<StageStatus> for String {
    fn from(status: StageStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One status payload returned by a status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_images_expected: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_status: Option<StageStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_status: Option<StageStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobSnapshot {
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            image_count: None,
            total_images_expected: None,
            images_status: None,
            video_status: None,
            error: None,
        }
    }

    pub fn with_images(mut self, count: u32, expected: Option<u32>) -> Self {
        self.image_count = Some(count);
        self.total_images_expected = expected;
        self
    }

    pub fn with_stages(mut self, images: Option<StageStatus>, video: Option<StageStatus>) -> Self {
        self.images_status = images;
        self.video_status = video;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
