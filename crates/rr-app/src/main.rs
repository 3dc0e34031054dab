use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use rr_app::ui::terminal::{TerminalMedia, TerminalStatus, TerminalSubmit};
use rr_app::ui::UiContext;
use rr_app::{AppConfig, AppEvent, Generator};
use rr_core::options::{DEFAULT_DURATION_SECS, MAX_DURATION_SECS, MIN_DURATION_SECS};
use rr_core::{Style, StoryOptions};

#[derive(Parser)]
#[command(name = "rotreel", version, about = "Turn a story into a short narrated video")]
struct Cli {
    /// Story service base URL (overrides ROTREEL_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Poll period in milliseconds (overrides ROTREEL_POLL_INTERVAL_MS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_ms: Option<u64>,

    /// Stop after this many status checks (overrides ROTREEL_MAX_POLLS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    max_polls: Option<u32>,

    /// Directory for finished videos (overrides ROTREEL_OUTPUT_DIR)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a story and follow the job until the video is ready
    Submit(SubmitArgs),
    /// List available background music and videos
    Catalog,
    /// List style presets
    Styles,
}

#[derive(Args)]
struct SubmitArgs {
    /// Story text
    #[arg(required_unless_present = "file")]
    text: Option<String>,

    /// Read the story from a file instead
    #[arg(long, short, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Target length in seconds
    #[arg(long, short, default_value_t = DEFAULT_DURATION_SECS as f64)]
    duration: f64,

    #[arg(long, short, default_value_t = Style::default())]
    style: Style,

    /// Background music file name, or "none"
    #[arg(long)]
    music: Option<String>,

    /// Background video file name, or "none"
    #[arg(long)]
    video: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(url) = &self.api_url {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll.interval = std::time::Duration::from_millis(ms);
        }
        if self.max_polls.is_some() {
            config.poll.max_polls = self.max_polls;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    cli.apply_overrides(&mut config);
    debug!(?config, "configuration loaded");

    match cli.command {
        Command::Submit(args) => submit(&config, args).await,
        Command::Catalog => catalog(&config).await,
        Command::Styles => {
            for style in Style::all() {
                println!("{:<12} {} - {}", style.id(), style.name(), style.description());
            }
            Ok(())
        }
    }
}

async fn submit(config: &AppConfig, args: SubmitArgs) -> anyhow::Result<()> {
    let text = match (&args.text, &args.file) {
        (_, Some(path)) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        (Some(text), None) => text.clone(),
        (None, None) => bail!("no story given"),
    };
    let options = StoryOptions::default()
        .with_duration_secs(args.duration.clamp(MIN_DURATION_SECS as f64, MAX_DURATION_SECS as f64))
        .with_style(args.style)
        .with_music(args.music)
        .with_video(args.video);

    let media = Arc::new(TerminalMedia::new(config.output_dir.clone(), config.request_timeout)?);
    let ui = UiContext::default()
        .with_status(Arc::new(TerminalStatus::default()))
        .with_submit(Arc::new(TerminalSubmit::default()))
        .with_media(media.clone());

    let (mut generator, mut events) = Generator::new(config, ui)?;
    let submitted = generator.submit_story(&text, &options).await?;

    while let Some(event) = events.recv().await {
        if event.generation() != submitted.generation {
            continue;
        }
        match event {
            AppEvent::JobComplete { job_id, .. } => {
                if let Some(path) = media.saved_path() {
                    debug!(%job_id, path = %path.display(), "done");
                }
                return Ok(());
            }
            AppEvent::JobFailed { job_id, error, .. } => bail!("job {job_id} failed: {error}"),
            _ => {}
        }
    }

    bail!("generator stopped before the job finished")
}

async fn catalog(config: &AppConfig) -> anyhow::Result<()> {
    let (generator, _events) = Generator::new(config, UiContext::default())?;
    let catalog = generator.catalog().await;

    println!("Music:");
    for entry in &catalog.music {
        println!("  {:<24} {}", entry.label, entry.value);
    }
    println!("Background videos:");
    for entry in &catalog.backgrounds {
        println!("  {:<24} {}", entry.label, entry.value);
    }
    Ok(())
}
