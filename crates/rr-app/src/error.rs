use thiserror::Error;

/// Failures talking to the story service.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("could not reach the story service: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered but refused the request. `message` is the
    /// service's own error text when it sent one.
    #[error("{message}")]
    Rejected { status: Option<u16>, message: String },
    #[error("unexpected response from the story service: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn rejected(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Rejected { status, message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Submission failed: {0}")]
    Submission(String),
    #[error("Status check failed: {0}")]
    PollTransport(String),
    #[error("Job failed: {reason}")]
    TerminalFailure { reason: String, timed_out: bool },
    #[error("Error loading video: {0}")]
    Render(String),
    #[error("No final status after {0} status checks")]
    PollLimit(u32),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}
