use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};
use rr_core::{DisplayText, Generation, GenerationCounter, JobId, JobSession, JobStatus, PollPolicy, StoryOptions};
use crate::error::AppError;
use crate::events::AppEvent;
use crate::generator::backend::schemas::StoryRequest;
use crate::generator::backend::StoryApi;
use crate::generator::poller::StatusPoller;
use crate::generator::renderer::ResultRenderer;
use crate::ui::UiContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub job_id: JobId,
    pub generation: Generation,
    pub initial_output: String,
    pub status: JobStatus,
}

/// Sends stories to the service and hands accepted jobs to the poller.
pub struct JobSubmitter {
    api: Arc<dyn StoryApi>,
    ui: UiContext,
    events: UnboundedSender<AppEvent>,
    poller: StatusPoller,
    generations: GenerationCounter,
}

impl JobSubmitter {
    pub fn new(
        api: Arc<dyn StoryApi>,
        ui: UiContext,
        policy: PollPolicy,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let renderer = Arc::new(ResultRenderer::new(api.clone(), ui.clone()));
        let poller = StatusPoller::new(api.clone(), renderer, ui.clone(), events.clone(), policy);

        Self {
            api,
            ui,
            events,
            poller,
            generations: GenerationCounter::new(),
        }
    }

    pub fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    /// Submits a story, dropping the previous session and its video first.
    /// The submit control stays busy until the new job reaches a final
    /// state; on error it is released right away and no session is created.
    pub async fn submit(&mut self, story_text: &str, options: &StoryOptions) -> Result<SubmissionResult, AppError> {
        self.ui.set_busy(true);
        self.poller.cancel();
        self.ui.reset_media();

        info!(
            duration = options.duration,
            style = %options.style,
            music = %options.music,
            video = %options.video,
            "submitting story"
        );
        let request = StoryRequest::new(story_text, options);
        let accepted = match self.api.create_story(&request).await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(error = %e, "story submission failed");
                self.ui.show_status(&DisplayText::error(format!("Error: {e}")));
                self.ui.set_busy(false);
                return Err(AppError::Submission(e.to_string()));
            }
        };

        let session = JobSession::new(
            accepted.job_id,
            self.generations.next(),
            accepted.rot_output,
            accepted.status,
        );
        self.ui.show_output(session.initial_output());

        let result = SubmissionResult {
            job_id: session.id().clone(),
            generation: session.generation(),
            initial_output: session.initial_output().to_string(),
            status: session.status().clone(),
        };
        info!(job_id = %result.job_id, generation = %result.generation, status = %result.status, "story accepted");
        let _ = self.events.send(AppEvent::JobSubmitted {
            job_id: result.job_id.clone(),
            generation: result.generation,
        });

        self.poller.start(session);
        Ok(result)
    }

    /// Drops the active session, if any.
    pub fn cancel(&mut self) {
        self.poller.cancel();
        self.ui.set_busy(false);
    }
}
