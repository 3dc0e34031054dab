//! Local tracking state for one submitted job.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use crate::job::{JobId, JobSnapshot, JobStatus, StageStatus};
use crate::presenter::{self, DisplayText};

/// Token distinguishing the active session from superseded ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct GenerationCounter {
    last: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out strictly increasing generations, starting at 1.
    pub fn next(&self) -> Generation {
        Generation(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollerState {
    #[default]
    Idle,
    Polling,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Hard ceiling on status queries per session. `None` polls until a
    /// terminal status or a transport error.
    pub max_polls: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_polls: None,
        }
    }
}

/// What the poller should do after applying a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    Continue,
    Completed,
    Failed { reason: Option<String>, timed_out: bool },
    LimitReached(u32),
}

impl PollStep {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub display: DisplayText,
    pub step: PollStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSession {
    id: JobId,
    generation: Generation,
    initial_output: String,
    status: JobStatus,
    image_count: Option<u32>,
    total_images_expected: Option<u32>,
    images_status: Option<StageStatus>,
    video_status: Option<StageStatus>,
    error: Option<String>,
    polls: u32,
    video_polls: u32,
}

impl JobSession {
    pub fn new(id: JobId, generation: Generation, initial_output: String, status: JobStatus) -> Self {
        Self {
            id,
            generation,
            initial_output,
            status,
            image_count: None,
            total_images_expected: None,
            images_status: None,
            video_status: None,
            error: None,
            polls: 0,
            video_polls: 0,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn initial_output(&self) -> &str {
        &self.initial_output
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Status responses applied so far.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            status: self.status.clone(),
            image_count: self.image_count,
            total_images_expected: self.total_images_expected,
            images_status: self.images_status.clone(),
            video_status: self.video_status.clone(),
            error: self.error.clone(),
        }
    }

    /// Step implied by the current status alone.
    pub fn step(&self) -> PollStep {
        match self.status {
            JobStatus::Completed | JobStatus::CompletedWithErrors => PollStep::Completed,
            JobStatus::Failed => PollStep::Failed {
                reason: self.error.clone(),
                timed_out: self.video_status == Some(StageStatus::Timeout),
            },
            _ => PollStep::Continue,
        }
    }

    /// Applies a fresh snapshot and decides what happens next. Pure: no I/O,
    /// no clock.
    pub fn advance(&mut self, snapshot: JobSnapshot, policy: &PollPolicy) -> Advance {
        self.polls += 1;
        if snapshot.status == JobStatus::ProcessingVideo {
            self.video_polls += 1;
        }

        let mut display = presenter::render(&snapshot);
        if snapshot.status == JobStatus::ProcessingVideo {
            if let Some(notice) = presenter::video_wait_notice(self.video_polls, policy.interval) {
                display = notice;
            }
        }

        self.status = snapshot.status;
        self.image_count = snapshot.image_count;
        self.total_images_expected = snapshot.total_images_expected;
        self.images_status = snapshot.images_status;
        self.video_status = snapshot.video_status;
        self.error = snapshot.error;

        let step = match (self.step(), policy.max_polls) {
            (PollStep::Continue, Some(max)) if self.polls >= max => PollStep::LimitReached(max),
            (step, _) => step,
        };

        Advance { display, step }
    }
}
