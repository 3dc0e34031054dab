//! Plain terminal rendering for the `rotreel` binary.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info};
use rr_core::{DisplayText, Severity};
use crate::ui::{DownloadLink, MediaView, StatusView, SubmitControl};

/// Prints status lines, skipping repeats so a steady poll does not flood
/// the terminal.
#[derive(Default)]
pub struct TerminalStatus {
    last_line: Mutex<Option<String>>,
}

impl StatusView for TerminalStatus {
    fn show_status(&self, text: &DisplayText) {
        let mut last = self.last_line.lock().unwrap_or_else(PoisonError::into_inner);
        if last.as_deref() == Some(text.text.as_str()) {
            return;
        }
        match text.severity {
            Severity::Info => println!("  {}", text.text),
            Severity::Error => eprintln!("✗ {}", text.text),
        }
        *last = Some(text.text.clone());
    }

    fn show_output(&self, text: &str) {
        println!("\n{}\n", text.trim());
    }

    fn hide_progress(&self) {
        *self.last_line.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[derive(Default)]
pub struct TerminalSubmit {
    busy: AtomicBool,
}

impl TerminalSubmit {
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

impl SubmitControl for TerminalSubmit {
    fn set_busy(&self, busy: bool) {
        debug!(busy, "submit control");
        self.busy.store(busy, Ordering::SeqCst);
    }
}

/// Downloads the finished video into the output directory.
pub struct TerminalMedia {
    client: reqwest::Client,
    output_dir: PathBuf,
    staged: Mutex<Option<PathBuf>>,
    saved: Mutex<Option<PathBuf>>,
}

impl TerminalMedia {
    pub fn new(output_dir: PathBuf, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            output_dir,
            staged: Mutex::new(None),
            saved: Mutex::new(None),
        })
    }

    /// Final location of the last downloaded video.
    pub fn saved_path(&self) -> Option<PathBuf> {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl MediaView for TerminalMedia {
    async fn load(&self, url: &str) -> anyhow::Result<()> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        if bytes.is_empty() {
            anyhow::bail!("video endpoint returned no data");
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("creating {}", self.output_dir.display()))?;
        let path = self.output_dir.join(".loading.mp4");
        tokio::fs::write(&path, &bytes).await?;
        debug!(bytes = bytes.len(), path = %path.display(), "video staged");

        *self.staged.lock().unwrap_or_else(PoisonError::into_inner) = Some(path);
        Ok(())
    }

    fn reveal(&self) {
        println!("🎬 Video ready");
    }

    fn enable_download(&self, download: DownloadLink) {
        let Some(staged) = self.staged.lock().unwrap_or_else(PoisonError::into_inner).take() else {
            return;
        };
        let target = self.output_dir.join(&download.file_name);
        match std::fs::rename(&staged, &target) {
            Ok(()) => {
                info!(job_id = %download.job_id, path = %target.display(), "video saved");
                println!("💾 Saved to {} (source: {})", target.display(), download.url);
                *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(target);
            }
            Err(e) => eprintln!("✗ Could not save video to {}: {e}", target.display()),
        }
    }

    fn reset(&self) {
        if let Some(staged) = self.staged.lock().unwrap_or_else(PoisonError::into_inner).take() {
            if let Err(e) = std::fs::remove_file(&staged) {
                debug!(path = %staged.display(), error = %e, "could not drop staged video");
            }
        }
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
