pub mod job;
pub mod options;
pub mod presenter;
pub mod session;
mod style;

pub use job::{JobId, JobSnapshot, JobStatus, StageStatus};
pub use options::StoryOptions;
pub use presenter::{DisplayText, Severity};
pub use session::{Advance, Generation, GenerationCounter, JobSession, PollPolicy, PollStep, PollerState};
pub use style::{Style, UnknownStyle};
