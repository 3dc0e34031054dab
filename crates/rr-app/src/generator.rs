use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use rr_core::StoryOptions;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::events::AppEvent;
use crate::generator::backend::{GenBackend, StoryApi};
use crate::generator::submitter::{JobSubmitter, SubmissionResult};
use crate::ui::UiContext;

pub mod backend;
pub mod poller;
pub mod renderer;
pub mod submitter;

/// Story service client plus the job lifecycle wired to one set of UI
/// collaborators.
pub struct Generator {
    backend: Arc<dyn StoryApi>,
    submitter: JobSubmitter,
}

impl Generator {
    pub fn new(config: &AppConfig, ui: UiContext) -> Result<(Self, UnboundedReceiver<AppEvent>), AppError> {
        let backend: Arc<dyn StoryApi> = Arc::new(GenBackend::new(config)?);
        Ok(Self::with_backend(backend, config, ui))
    }

    pub fn with_backend(
        backend: Arc<dyn StoryApi>,
        config: &AppConfig,
        ui: UiContext,
    ) -> (Self, UnboundedReceiver<AppEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let submitter = JobSubmitter::new(backend.clone(), ui, config.poll.clone(), events_tx);

        (Self { backend, submitter }, events_rx)
    }

    pub async fn submit_story(&mut self, text: &str, options: &StoryOptions) -> Result<SubmissionResult, AppError> {
        self.submitter.submit(text, options).await
    }

    pub async fn catalog(&self) -> Catalog {
        Catalog::fetch(self.backend.as_ref()).await
    }

    pub fn submitter(&self) -> &JobSubmitter {
        &self.submitter
    }

    pub fn cancel(&mut self) {
        self.submitter.cancel();
    }
}
