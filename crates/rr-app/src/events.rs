use rr_core::{Generation, JobId, JobStatus};

/// Lifecycle notifications for the host driving the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    JobSubmitted {
        job_id: JobId,
        generation: Generation,
    },
    JobProgress {
        job_id: JobId,
        generation: Generation,
        status: JobStatus,
    },
    /// The video was loaded and handed to the media view.
    JobComplete {
        job_id: JobId,
        generation: Generation,
    },
    JobFailed {
        job_id: JobId,
        generation: Generation,
        error: String,
    },
}

impl AppEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::JobComplete { .. } | Self::JobFailed { .. })
    }

    pub fn generation(&self) -> Generation {
        match self {
            Self::JobSubmitted { generation, .. }
            | Self::JobProgress { generation, .. }
            | Self::JobComplete { generation, .. }
            | Self::JobFailed { generation, .. } => *generation,
        }
    }
}
