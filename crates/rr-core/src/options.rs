use serde::Serialize;
use crate::style::Style;

pub const DEFAULT_DURATION_SECS: u32 = 30;
pub const MIN_DURATION_SECS: u32 = 10;
pub const MAX_DURATION_SECS: u32 = 60;

/// Value sent for music or background when nothing is selected.
pub const NO_SELECTION: &str = "none";

/// Generation options sent along with the story text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryOptions {
    pub duration: u32,
    pub style: Style,
    pub music: String,
    pub video: String,
}

impl Default for StoryOptions {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION_SECS,
            style: Style::default(),
            music: NO_SELECTION.to_string(),
            video: NO_SELECTION.to_string(),
        }
    }
}

impl StoryOptions {
    /// Snaps a slider value to whole seconds.
    pub fn with_duration_secs(mut self, secs: f64) -> Self {
        self.duration = secs.round() as u32;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_music(mut self, music: Option<String>) -> Self {
        self.music = selection(music);
        self
    }

    pub fn with_video(mut self, video: Option<String>) -> Self {
        self.video = selection(video);
        self
    }
}

fn selection(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NO_SELECTION.to_string(),
    }
}
