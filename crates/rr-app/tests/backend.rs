//! `GenBackend` and the terminal media view against an axum mock of the
//! story service.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use rr_app::generator::backend::schemas::StoryRequest;
use rr_app::generator::backend::{GenBackend, StoryApi};
use rr_app::ui::terminal::TerminalMedia;
use rr_app::ui::{DownloadLink, MediaView};
use rr_app::{ApiError, AppConfig, AppEvent, Generator};
use rr_core::{JobId, JobStatus, Style, StoryOptions};
use common::{next_terminal, RecordingUi, UiCall};

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.api_url = url.to_string();
    config.request_timeout = Duration::from_secs(5);
    config.poll.interval = Duration::from_millis(20);
    config
}

fn backend(url: &str) -> GenBackend {
    GenBackend::new(&config(url)).unwrap()
}

#[tokio::test]
async fn create_story_posts_options_and_reads_ack() {
    let received: Arc<Mutex<Option<Value>>> = Arc::default();
    let app = Router::new()
        .route(
            "/api/v1/stories",
            post(|State(received): State<Arc<Mutex<Option<Value>>>>, Json(body): Json<Value>| async move {
                *received.lock().unwrap() = Some(body);
                Json(json!({
                    "success": true,
                    "data": { "job_id": "abc123", "rot_output": "ts lowkey fire fr", "status": "processing_images" }
                }))
            }),
        )
        .with_state(received.clone());
    let url = serve(app).await;

    let options = StoryOptions::default()
        .with_duration_secs(41.6)
        .with_style(Style::Educational)
        .with_video(Some("subway.mp4".into()));
    let accepted = backend(&url)
        .create_story(&StoryRequest::new("The tortoise won the race.", &options))
        .await
        .unwrap();

    assert_eq!(accepted.job_id, JobId::new("abc123"));
    assert_eq!(accepted.rot_output, "ts lowkey fire fr");
    assert_eq!(accepted.status, JobStatus::ProcessingImages);
    assert_eq!(
        received.lock().unwrap().clone().unwrap(),
        json!({
            "text": "The tortoise won the race.",
            "duration": 42,
            "style": "educational",
            "music": "none",
            "video": "subway.mp4"
        })
    );
}

#[tokio::test]
async fn rejected_story_carries_server_message() {
    let app = Router::new().route(
        "/api/v1/stories",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": "Story text is required" })),
            )
        }),
    );
    let url = serve(app).await;

    let err = backend(&url)
        .create_story(&StoryRequest::new("", &StoryOptions::default()))
        .await
        .unwrap_err();
    match err {
        ApiError::Rejected { status, message } => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "Story text is required");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn error_without_json_body_falls_back_to_status_code() {
    let app = Router::new().route("/api/v1/stories", post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }));
    let url = serve(app).await;

    let err = backend(&url)
        .create_story(&StoryRequest::new("story", &StoryOptions::default()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "API request failed with status: 502");
}

#[tokio::test]
async fn ok_status_without_success_flag_is_a_failed_submission() {
    let app = Router::new().route(
        "/api/v1/stories",
        post(|| async { Json(json!({ "success": false, "error": "quota exceeded" })) }),
    );
    let url = serve(app).await;

    let err = backend(&url)
        .create_story(&StoryRequest::new("story", &StoryOptions::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: None, ref message } if message == "quota exceeded"));
}

#[tokio::test]
async fn job_status_reads_snapshot() {
    let app = Router::new().route(
        "/api/v1/stories/{job_id}",
        get(|Path(job_id): Path<String>| async move {
            if job_id != "abc123" {
                return (StatusCode::NOT_FOUND, Json(json!({ "success": false, "error": "Job not found" })));
            }
            (
                StatusCode::OK,
                Json(json!({ "data": { "status": "processing_images", "image_count": 2, "total_images_expected": 6 } })),
            )
        }),
    );
    let url = serve(app).await;
    let backend = backend(&url);

    let snapshot = backend.job_status(&JobId::new("abc123")).await.unwrap();
    assert_eq!(snapshot.status, JobStatus::ProcessingImages);
    assert_eq!(snapshot.image_count, Some(2));
    assert_eq!(snapshot.total_images_expected, Some(6));

    let err = backend.job_status(&JobId::new("nope")).await.unwrap_err();
    assert_eq!(err.to_string(), "Job not found");
}

#[tokio::test]
async fn lists_music_and_backgrounds() {
    let app = Router::new()
        .route("/api/v1/music", get(|| async { Json(json!({ "success": true, "data": ["lofi.mp3"] })) }))
        .route(
            "/api/v1/videos/backgrounds",
            get(|| async { Json(json!({ "success": true, "data": ["minecraft.mp4", "subway.MOV"] })) }),
        );
    let url = serve(app).await;
    let backend = backend(&url);

    assert_eq!(backend.list_music().await.unwrap(), vec!["lofi.mp3"]);
    assert_eq!(backend.list_backgrounds().await.unwrap(), vec!["minecraft.mp4", "subway.MOV"]);
    assert_eq!(backend.video_url(&JobId::new("abc")), format!("{url}/api/v1/videos/abc"));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = backend(&format!("http://{addr}"))
        .job_status(&JobId::new("abc"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn generator_follows_job_to_completion() {
    let polls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/api/v1/stories",
            post(|| async {
                Json(json!({
                    "success": true,
                    "data": { "job_id": "job-42", "rot_output": "sigma tortoise", "status": "processing_images" }
                }))
            }),
        )
        .route(
            "/api/v1/stories/{job_id}",
            get(|State(polls): State<Arc<AtomicUsize>>| async move {
                let data = match polls.fetch_add(1, Ordering::SeqCst) {
                    0 => json!({ "status": "processing_images", "image_count": 1 }),
                    1 => json!({ "status": "processing_video", "image_count": 3, "images_status": "completed", "video_status": "processing" }),
                    _ => json!({ "status": "completed", "image_count": 3 }),
                };
                Json(json!({ "success": true, "data": data }))
            }),
        )
        .with_state(polls.clone());
    let url = serve(app).await;

    let ui = RecordingUi::new();
    let (mut generator, mut events) = Generator::new(&config(&url), ui.context()).unwrap();
    let submitted = generator.submit_story("slow and steady", &StoryOptions::default()).await.unwrap();

    let event = next_terminal(&mut events).await;
    assert_eq!(
        event,
        AppEvent::JobComplete { job_id: JobId::new("job-42"), generation: submitted.generation }
    );

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(polls.load(Ordering::SeqCst), 3);

    let statuses: Vec<String> = ui.statuses().into_iter().map(|s| s.text).collect();
    assert!(statuses.contains(&"3 images created! Now editing video (this may take several minutes)...".to_string()));
    let loaded = ui.calls().into_iter().any(|c| match c {
        UiCall::Load(u) => u.starts_with(&format!("{url}/api/v1/videos/job-42?t=")),
        _ => false,
    });
    assert!(loaded);
    assert!(!ui.is_busy());
}

#[tokio::test]
async fn terminal_media_downloads_and_saves_video() {
    let app = Router::new().route("/api/v1/videos/{job_id}", get(|| async { vec![0u8, 0, 0, 24, 102, 116, 121, 112] }));
    let url = serve(app).await;
    let dir = std::env::temp_dir().join(format!("rotreel-media-{}", std::process::id()));

    let media = TerminalMedia::new(dir.clone(), Duration::from_secs(5)).unwrap();
    let job_id = JobId::new("job-7");
    media.load(&format!("{url}/api/v1/videos/job-7?t=1")).await.unwrap();
    media.enable_download(DownloadLink::new(&job_id, format!("{url}/api/v1/videos/job-7")));

    let saved = media.saved_path().unwrap();
    assert_eq!(saved, dir.join("brain-rot-video-job-7.mp4"));
    assert_eq!(std::fs::read(&saved).unwrap().len(), 8);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn terminal_media_reports_missing_video() {
    let app = Router::new().route(
        "/api/v1/videos/{job_id}",
        get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "success": false, "error": "Video not found" }))) }),
    );
    let url = serve(app).await;
    let dir = std::env::temp_dir().join(format!("rotreel-missing-{}", std::process::id()));

    let media = TerminalMedia::new(dir, Duration::from_secs(5)).unwrap();
    assert!(media.load(&format!("{url}/api/v1/videos/job-8")).await.is_err());
    assert!(media.saved_path().is_none());
}
