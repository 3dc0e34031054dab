//! Maps job snapshots to the line of text shown to the user.
//!
//! Rendering is an ordered rule table: the first rule whose condition holds
//! produces the text. Nothing carries over between snapshots, so the same
//! snapshot always renders the same way.

use std::fmt;
use std::time::Duration;
use crate::job::{JobSnapshot, JobStatus, StageStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayText {
    pub text: String,
    pub severity: Severity,
}

impl DisplayText {
    pub fn info(text: impl Into<String>) -> Self {
        Self { text: text.into(), severity: Severity::Info }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), severity: Severity::Error }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for DisplayText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub const TIMEOUT_GUIDANCE: &str =
    "Video processing timed out. This can happen with longer stories. Please try with a shorter story.";
pub const GENERIC_FAILURE: &str = "Processing failed";

/// Polls spent in video editing before the long-wait notice kicks in.
const VIDEO_WAIT_GRACE_POLLS: u32 = 15;
const VIDEO_WAIT_NOTICE_EVERY: u32 = 5;

struct Rule {
    applies: fn(&JobSnapshot) -> bool,
    render: fn(&JobSnapshot) -> DisplayText,
}

const RULES: &[Rule] = &[
    // Stage sub-statuses can run ahead of the overall status.
    Rule { applies: images_done_video_running, render: render_video_handoff },
    Rule { applies: processing_images, render: render_images_progress },
    Rule { applies: processing_video, render: render_video_progress },
    Rule { applies: completed, render: render_completed },
    Rule { applies: completed_with_errors, render: render_completed_with_errors },
    Rule { applies: timed_out, render: render_timeout },
    Rule { applies: failed, render: render_failure },
];

pub fn render(snapshot: &JobSnapshot) -> DisplayText {
    RULES
        .iter()
        .find(|rule| (rule.applies)(snapshot))
        .map(|rule| (rule.render)(snapshot))
        .unwrap_or_else(|| DisplayText::info(format!("Processing: {}", snapshot.status)))
}

/// Extra reassurance for long video edits, shown every few polls once the
/// edit has been running for a while.
pub fn video_wait_notice(video_polls: u32, interval: Duration) -> Option<DisplayText> {
    if video_polls <= VIDEO_WAIT_GRACE_POLLS || video_polls % VIDEO_WAIT_NOTICE_EVERY != 0 {
        return None;
    }
    let minutes = (interval * video_polls).as_secs() / 60;
    let unit = if minutes == 1 { "minute" } else { "minutes" };
    Some(DisplayText::info(format!("Still processing video... ({minutes} {unit})")))
}

fn images_done_video_running(s: &JobSnapshot) -> bool {
    s.images_status == Some(StageStatus::Completed) && s.video_status == Some(StageStatus::Processing)
}

fn processing_images(s: &JobSnapshot) -> bool {
    s.status == JobStatus::ProcessingImages
}

fn processing_video(s: &JobSnapshot) -> bool {
    s.status == JobStatus::ProcessingVideo
}

fn completed(s: &JobSnapshot) -> bool {
    s.status == JobStatus::Completed
}

fn completed_with_errors(s: &JobSnapshot) -> bool {
    s.status == JobStatus::CompletedWithErrors
}

fn timed_out(s: &JobSnapshot) -> bool {
    failed(s) && s.video_status == Some(StageStatus::Timeout)
}

fn failed(s: &JobSnapshot) -> bool {
    s.status == JobStatus::Failed
}

fn render_video_handoff(s: &JobSnapshot) -> DisplayText {
    let text = match s.image_count {
        Some(n) => format!("{n} images created! Now editing video (this may take several minutes)..."),
        None => "Images created! Now editing video (this may take several minutes)...".to_string(),
    };
    DisplayText::info(text)
}

fn render_images_progress(s: &JobSnapshot) -> DisplayText {
    let Some(n) = s.image_count else {
        return DisplayText::info("Generating images...");
    };
    let noun = if n == 1 { "image" } else { "images" };
    let text = match s.total_images_expected {
        Some(total) => format!("Generating images... {n} {noun} created of {total}"),
        None => format!("Generating images... {n} {noun} created"),
    };
    DisplayText::info(text)
}

fn render_video_progress(s: &JobSnapshot) -> DisplayText {
    let text = match s.image_count {
        Some(n) => format!("Editing video with {n} images... (this may take a few minutes)"),
        None => "Editing video... (this may take a few minutes)".to_string(),
    };
    DisplayText::info(text)
}

fn render_completed(s: &JobSnapshot) -> DisplayText {
    let text = match s.image_count {
        Some(n) => format!("Processing complete! Created video with {n} images."),
        None => "Processing complete!".to_string(),
    };
    DisplayText::info(text)
}

fn render_completed_with_errors(_: &JobSnapshot) -> DisplayText {
    DisplayText::info("Video processed with issues. Attempting to display...")
}

fn render_timeout(_: &JobSnapshot) -> DisplayText {
    DisplayText::error(TIMEOUT_GUIDANCE)
}

fn render_failure(s: &JobSnapshot) -> DisplayText {
    DisplayText::error(format!("Error: {}", s.error.as_deref().unwrap_or(GENERIC_FAILURE)))
}
