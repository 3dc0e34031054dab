//! Music and background-video choices offered next to the story box.

use tracing::error;
use rr_core::options::NO_SELECTION;
use crate::generator::backend::StoryApi;

const MUSIC_EXTENSIONS: &[&str] = &[".mp3"];
const BACKGROUND_EXTENSIONS: &[&str] = &[".mp4", ".mov"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Value to send in the story options.
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub music: Vec<CatalogEntry>,
    pub backgrounds: Vec<CatalogEntry>,
}

impl Catalog {
    /// Fetches both lists. A list that fails to load only offers `none`.
    pub async fn fetch(api: &dyn StoryApi) -> Self {
        let music = match api.list_music().await {
            Ok(files) => files,
            Err(e) => {
                error!(error = %e, "could not fetch music options");
                Vec::new()
            }
        };
        let backgrounds = match api.list_backgrounds().await {
            Ok(files) => files,
            Err(e) => {
                error!(error = %e, "could not fetch background video options");
                Vec::new()
            }
        };

        Self {
            music: entries(music, MUSIC_EXTENSIONS),
            backgrounds: entries(backgrounds, BACKGROUND_EXTENSIONS),
        }
    }
}

fn entries(files: Vec<String>, extensions: &[&str]) -> Vec<CatalogEntry> {
    let none = CatalogEntry {
        value: NO_SELECTION.to_string(),
        label: "None".to_string(),
    };
    std::iter::once(none)
        .chain(files.into_iter().map(|file| CatalogEntry {
            label: strip_extension(&file, extensions).to_string(),
            value: file,
        }))
        .collect()
}

fn strip_extension<'a>(file: &'a str, extensions: &[&str]) -> &'a str {
    extensions
        .iter()
        .find_map(|ext| {
            let split = file.len().checked_sub(ext.len())?;
            let tail = file.get(split..)?;
            tail.eq_ignore_ascii_case(ext).then(|| &file[..split])
        })
        .unwrap_or(file)
}
