// Shared fakes standing in for yt-dlp and ffmpeg
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};

use social_downloader_lib::downloader::extractors::{InfoExtractor, RawFormat, RawVideoInfo};
use social_downloader_lib::downloader::format_selector::FormatSelection;
use social_downloader_lib::downloader::tools::ToolManager;
use social_downloader_lib::downloader::{DownloadError, Downloader, DownloaderBackend};
use social_downloader_lib::processing::{MediaOperation, MediaProcessing};
use social_downloader_lib::server::{build_router, AppState, ServerStats};
use social_downloader_lib::users::UserStore;

pub struct FakeExtractor {
    pub title: Option<String>,
    /// Raw stderr to fail with
    pub fail_with: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl FakeExtractor {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            fail_with: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(stderr: &str) -> Self {
        Self {
            title: None,
            fail_with: Some(stderr.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl InfoExtractor for FakeExtractor {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn extract(&self, _url: &str) -> Result<RawVideoInfo, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(stderr) = &self.fail_with {
            return Err(DownloadError::extraction(DownloadError::from(stderr.clone())));
        }
        Ok(RawVideoInfo {
            id: Some("abc".into()),
            title: self.title.clone(),
            duration: Some(42.0),
            thumbnail: Some("https://img.example/t.jpg".into()),
            uploader: Some("someone".into()),
            view_count: Some(1000),
            like_count: Some(10),
            upload_date: Some("20240101".into()),
            description: Some("short".into()),
            formats: vec![RawFormat {
                format_id: "22".into(),
                ext: "mp4".into(),
                height: Some(720),
                width: Some(1280),
                vcodec: Some("avc1".into()),
                acodec: Some("mp4a".into()),
                ..Default::default()
            }],
        })
    }
}

/// Writes `<title>.<ext>` the way yt-dlp's output template would. The
/// extension is the recode target, else the first `[ext=..]` in the selector.
pub struct FakeBackend {
    pub title: String,
    pub calls: Arc<AtomicUsize>,
}

fn selected_container(selection: &FormatSelection) -> String {
    if let Some(recode) = &selection.recode_to {
        return recode.clone();
    }
    selection
        .spec
        .split("[ext=")
        .nth(1)
        .and_then(|rest| rest.split(']').next())
        .unwrap_or("mp4")
        .to_string()
}

#[async_trait]
impl DownloaderBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn download(
        &self,
        _url: &str,
        selection: &FormatSelection,
        output_dir: &Path,
    ) -> Result<(), DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = format!("{}.{}", self.title, selected_container(selection));
        std::fs::write(output_dir.join(name), b"video-bytes")?;
        Ok(())
    }
}

pub struct FakeProcessor {
    pub succeed: bool,
}

#[async_trait]
impl MediaProcessing for FakeProcessor {
    async fn apply(&self, _operation: &MediaOperation, _input: &Path, output: &Path) -> bool {
        self.succeed && std::fs::write(output, b"processed").is_ok()
    }

    async fn probe(&self, _path: &Path) -> Value {
        json!({})
    }
}

pub struct Harness {
    pub router: Router,
    pub stats: Arc<ServerStats>,
    pub extractor_calls: Arc<AtomicUsize>,
    pub backend_calls: Arc<AtomicUsize>,
}

impl Harness {
    /// Total calls that reached either fake tool
    pub fn tool_calls(&self) -> usize {
        self.extractor_calls.load(Ordering::SeqCst) + self.backend_calls.load(Ordering::SeqCst)
    }
}

pub async fn harness_with(extractor: FakeExtractor, processor_succeeds: bool) -> Harness {
    let title = extractor.title.clone().unwrap_or_else(|| "video".into());
    let extractor_calls = extractor.calls.clone();
    let backend_calls = Arc::new(AtomicUsize::new(0));
    let backend = FakeBackend {
        title,
        calls: backend_calls.clone(),
    };
    let downloader = Downloader::new(Arc::new(extractor), Arc::new(backend));
    let stats = Arc::new(ServerStats::new());
    let state = AppState {
        downloader: Arc::new(downloader),
        processor: Arc::new(FakeProcessor {
            succeed: processor_succeeds,
        }),
        users: UserStore::connect("sqlite::memory:")
            .await
            .expect("in-memory database"),
        tools: Arc::new(ToolManager::default()),
        stats: stats.clone(),
    };
    Harness {
        router: build_router(state),
        stats,
        extractor_calls,
        backend_calls,
    }
}

pub async fn harness() -> Harness {
    harness_with(FakeExtractor::titled("My Clip"), true).await
}
