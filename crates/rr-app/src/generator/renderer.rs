use std::sync::Arc;
use chrono::Utc;
use tracing::{debug, error, info, warn};
use rr_core::{DisplayText, JobId};
use crate::error::AppError;
use crate::generator::backend::StoryApi;
use crate::ui::{DownloadLink, UiContext};

pub const LOADING_TEXT: &str = "Loading video, please wait...";
pub const LOAD_FAILED_TEXT: &str = "Error loading video. Please try again later.";

/// Shows the finished video for a job. Rendering is split around the async
/// load so the caller can check the job is still current before each part.
pub struct ResultRenderer {
    api: Arc<dyn StoryApi>,
    ui: UiContext,
}

impl ResultRenderer {
    pub fn new(api: Arc<dyn StoryApi>, ui: UiContext) -> Self {
        Self { api, ui }
    }

    /// Video locator with a timestamp so a reload never gets a stale copy.
    pub fn media_url(&self, job_id: &JobId) -> String {
        format!("{}?t={}", self.api.video_url(job_id), Utc::now().timestamp_millis())
    }

    /// Shows the loading text and returns the locator to load, or `None`
    /// when no media view is attached.
    pub fn prepare(&self, job_id: &JobId) -> Option<String> {
        if self.ui.media.is_none() {
            warn!(%job_id, "media view not attached, skipping video");
            return None;
        }

        let url = self.media_url(job_id);
        debug!(%job_id, %url, "loading video");
        self.ui.show_status(&DisplayText::info(LOADING_TEXT));
        Some(url)
    }

    /// Loads `url` into the media view. Nothing is rendered here; the
    /// result goes to [`ResultRenderer::show`].
    pub async fn load(&self, url: &str) -> anyhow::Result<()> {
        match self.ui.media.as_ref() {
            Some(media) => media.load(url).await,
            None => Ok(()),
        }
    }

    /// Renders the outcome of [`ResultRenderer::load`]. A load failure is
    /// shown to the user and returned.
    pub fn show(&self, job_id: &JobId, loaded: anyhow::Result<()>) -> Result<(), AppError> {
        if let Err(e) = loaded {
            error!(%job_id, error = %e, "video failed to load");
            self.ui.show_status(&DisplayText::error(LOAD_FAILED_TEXT));
            return Err(AppError::Render(e.to_string()));
        }

        let Some(media) = self.ui.media.as_ref() else {
            return Ok(());
        };
        self.ui.hide_progress();
        media.reveal();
        media.enable_download(DownloadLink::new(job_id, self.api.video_url(job_id)));
        info!(%job_id, "video ready");
        Ok(())
    }
}
