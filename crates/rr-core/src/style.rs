use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Narration style presets understood by the story service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    #[default]
    BrainRot,
    Educational,
    Storytime,
}

impl Style {
    /// Preset name for display
    pub fn name(&self) -> &str {
        match self {
            Self::BrainRot => "Brain Rot",
            Self::Educational => "Educational",
            Self::Storytime => "Storytime",
        }
    }

    /// Preset ID for API communication
    pub fn id(&self) -> &'static str {
        match self {
            Self::BrainRot => "brain-rot",
            Self::Educational => "educational",
            Self::Storytime => "storytime",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::BrainRot => "Meme-heavy narration over gameplay footage",
            Self::Educational => "Calmer narration focused on the facts of the story",
            Self::Storytime => "Plain retelling with a narrative arc",
        }
    }

    /// All available presets, in picker order
    pub fn all() -> [Style; 3] {
        [Self::BrainRot, Self::Educational, Self::Storytime]
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown style preset '{0}'")]
pub struct UnknownStyle(pub String);

impl FromStr for Style {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|style| style.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}
