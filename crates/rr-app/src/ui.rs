pub mod terminal;

use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, warn};
use rr_core::{DisplayText, JobId};

/// Where progress and status lines go.
pub trait StatusView: Send + Sync {
    fn show_status(&self, text: &DisplayText);

    /// Text the service returned right away at submission.
    fn show_output(&self, text: &str);

    fn hide_progress(&self);
}

/// The control that starts a submission.
pub trait SubmitControl: Send + Sync {
    fn set_busy(&self, busy: bool);
}

#[async_trait]
pub trait MediaView: Send + Sync {
    /// Loads the media at `url`. An error is a load failure.
    async fn load(&self, url: &str) -> anyhow::Result<()>;

    fn reveal(&self);

    fn enable_download(&self, download: DownloadLink);

    /// Hides the previous video and its download.
    fn reset(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub job_id: JobId,
    pub url: String,
    pub file_name: String,
}

impl DownloadLink {
    pub fn new(job_id: &JobId, url: String) -> Self {
        Self {
            job_id: job_id.clone(),
            url,
            file_name: format!("brain-rot-video-{job_id}.mp4"),
        }
    }
}

/// UI collaborators handed to the generator. Any of them may be missing;
/// calls to a missing one are logged and dropped.
#[derive(Clone, Default)]
pub struct UiContext {
    pub status: Option<Arc<dyn StatusView>>,
    pub submit: Option<Arc<dyn SubmitControl>>,
    pub media: Option<Arc<dyn MediaView>>,
}

impl UiContext {
    pub fn with_status(mut self, view: Arc<dyn StatusView>) -> Self {
        self.status = Some(view);
        self
    }

    pub fn with_submit(mut self, control: Arc<dyn SubmitControl>) -> Self {
        self.submit = Some(control);
        self
    }

    pub fn with_media(mut self, view: Arc<dyn MediaView>) -> Self {
        self.media = Some(view);
        self
    }

    pub fn show_status(&self, text: &DisplayText) {
        match &self.status {
            Some(view) => view.show_status(text),
            None => warn!(text = %text, "status view not attached"),
        }
    }

    pub fn show_output(&self, text: &str) {
        match &self.status {
            Some(view) => view.show_output(text),
            None => warn!("status view not attached, dropping story output"),
        }
    }

    pub fn hide_progress(&self) {
        if let Some(view) = &self.status {
            view.hide_progress();
        }
    }

    pub fn reset_media(&self) {
        if let Some(view) = &self.media {
            view.reset();
        }
    }

    pub fn set_busy(&self, busy: bool) {
        match &self.submit {
            Some(control) => control.set_busy(busy),
            None => debug!(busy, "submit control not attached"),
        }
    }
}
