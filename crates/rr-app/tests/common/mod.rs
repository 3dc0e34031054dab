#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Notify;
use rr_app::generator::backend::schemas::{StoryAccepted, StoryRequest};
use rr_app::generator::backend::StoryApi;
use rr_app::ui::{DownloadLink, MediaView, StatusView, SubmitControl, UiContext};
use rr_app::{ApiError, AppEvent};
use rr_core::{DisplayText, JobId, JobSnapshot, JobStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    Status(DisplayText),
    Output(String),
    HideProgress,
    Busy(bool),
    Load(String),
    Reveal,
    Download(DownloadLink),
    Reset,
}

/// Records every call the generator makes into the UI.
#[derive(Default)]
pub struct RecordingUi {
    calls: Mutex<Vec<UiCall>>,
    fail_load: bool,
    load_stall: Option<Duration>,
    load_started: Notify,
}

impl RecordingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_media() -> Arc<Self> {
        Arc::new(Self { fail_load: true, ..Self::default() })
    }

    /// Media view whose load blocks its worker thread for `stall`.
    pub fn stalling_media(stall: Duration) -> Arc<Self> {
        Arc::new(Self { load_stall: Some(stall), ..Self::default() })
    }

    pub async fn wait_for_load(&self) {
        self.load_started.notified().await;
    }

    pub fn context(self: &Arc<Self>) -> UiContext {
        UiContext::default()
            .with_status(self.clone())
            .with_submit(self.clone())
            .with_media(self.clone())
    }

    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<DisplayText> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                UiCall::Status(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<DisplayText> {
        self.statuses().pop()
    }

    pub fn busy_flags(&self) -> Vec<bool> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                UiCall::Busy(busy) => Some(busy),
                _ => None,
            })
            .collect()
    }

    pub fn is_busy(&self) -> bool {
        self.busy_flags().last().copied().unwrap_or(false)
    }

    fn push(&self, call: UiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl StatusView for RecordingUi {
    fn show_status(&self, text: &DisplayText) {
        self.push(UiCall::Status(text.clone()));
    }

    fn show_output(&self, text: &str) {
        self.push(UiCall::Output(text.to_string()));
    }

    fn hide_progress(&self) {
        self.push(UiCall::HideProgress);
    }
}

impl SubmitControl for RecordingUi {
    fn set_busy(&self, busy: bool) {
        self.push(UiCall::Busy(busy));
    }
}

#[async_trait]
impl MediaView for RecordingUi {
    async fn load(&self, url: &str) -> anyhow::Result<()> {
        self.push(UiCall::Load(url.to_string()));
        self.load_started.notify_one();
        if let Some(stall) = self.load_stall {
            std::thread::sleep(stall);
        }
        if self.fail_load {
            anyhow::bail!("decoder error");
        }
        Ok(())
    }

    fn reveal(&self) {
        self.push(UiCall::Reveal);
    }

    fn enable_download(&self, download: DownloadLink) {
        self.push(UiCall::Download(download));
    }

    fn reset(&self) {
        self.push(UiCall::Reset);
    }
}

/// One scripted answer to a status query.
pub struct Reply {
    pub delay: Duration,
    pub result: Result<JobSnapshot, ApiError>,
}

impl Reply {
    pub fn ok(snapshot: JobSnapshot) -> Self {
        Self { delay: Duration::ZERO, result: Ok(snapshot) }
    }

    pub fn late(delay: Duration, snapshot: JobSnapshot) -> Self {
        Self { delay, result: Ok(snapshot) }
    }

    pub fn err(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(ApiError::rejected(Some(503), message)),
        }
    }
}

/// In-memory story service. Submissions are answered in order; status
/// queries pop per-job replies and repeat `processing_images` once a job's
/// script runs out.
#[derive(Default)]
pub struct ScriptedApi {
    submissions: Mutex<VecDeque<Result<StoryAccepted, ApiError>>>,
    replies: Mutex<HashMap<JobId, VecDeque<Reply>>>,
    status_calls: Mutex<HashMap<JobId, usize>>,
    total_status_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn accept(&self, job_id: &str, status: JobStatus) {
        self.submissions.lock().unwrap().push_back(Ok(StoryAccepted {
            job_id: JobId::new(job_id),
            rot_output: format!("rot output for {job_id}"),
            status,
        }));
    }

    pub fn refuse(&self, error: ApiError) {
        self.submissions.lock().unwrap().push_back(Err(error));
    }

    pub fn script(&self, job_id: &str, replies: Vec<Reply>) {
        self.replies.lock().unwrap().insert(JobId::new(job_id), replies.into());
    }

    pub fn status_calls(&self, job_id: &str) -> usize {
        self.status_calls.lock().unwrap().get(&JobId::new(job_id)).copied().unwrap_or(0)
    }

    pub fn total_status_calls(&self) -> usize {
        self.total_status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoryApi for ScriptedApi {
    async fn create_story(&self, _request: &StoryRequest) -> Result<StoryAccepted, ApiError> {
        self.submissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::rejected(None, "no submission scripted")))
    }

    async fn job_status(&self, job_id: &JobId) -> Result<JobSnapshot, ApiError> {
        *self.status_calls.lock().unwrap().entry(job_id.clone()).or_default() += 1;
        self.total_status_calls.fetch_add(1, Ordering::SeqCst);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(job_id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Reply::ok(JobSnapshot::new(JobStatus::ProcessingImages)));
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }

    async fn list_music(&self) -> Result<Vec<String>, ApiError> {
        Ok(vec!["phonk.mp3".into()])
    }

    async fn list_backgrounds(&self) -> Result<Vec<String>, ApiError> {
        Err(ApiError::rejected(Some(500), "disk not mounted"))
    }

    fn video_url(&self, job_id: &JobId) -> String {
        format!("http://story.test/api/v1/videos/{job_id}")
    }
}

/// Waits for the next terminal event, skipping progress updates.
pub async fn next_terminal(events: &mut UnboundedReceiver<AppEvent>) -> AppEvent {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(600), events.recv())
            .await
            .expect("timed out waiting for a terminal event")
            .expect("event channel closed");
        if event.is_terminal() {
            return event;
        }
    }
}
