// Downloader module - platform detection, yt-dlp extraction and downloads

pub mod backends;
pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod platforms;
pub mod tools;
pub mod traits;
pub mod utils;

pub use errors::DownloadError;
pub use models::{DownloadResult, FormatDescriptor, VideoMetadata};
pub use orchestrator::Downloader;
pub use platforms::{detect_platform, Platform, PlatformInfo, SUPPORTED_PLATFORMS};
pub use traits::DownloaderBackend;
