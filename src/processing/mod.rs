// Media post-processing via ffmpeg / ffprobe
//
// - commands: argument templates and the MediaCommand builder
// - processor: bool-returning operations over the templates
// - presets: fixed per-platform post-processing table

pub mod commands;
pub mod presets;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub use commands::{BlurRegion, CompressionTarget, MediaCommand, MediaCommandBuilder};
pub use presets::{apply_preset, preset_for};
pub use processor::MediaProcessor;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Media tool not found: {0}")]
    ToolNotFound(String),

    #[error("{description} failed: {stderr}")]
    Failed { description: String, stderr: String },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Video duration is unknown")]
    UnknownDuration,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One post-processing step with its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum MediaOperation {
    /// Scale to `resolution` (e.g. "1920x1080") and re-encode
    Enhance { resolution: String },
    /// Crop expression for ffmpeg's crop filter
    Crop { params: String },
    /// Blur region as `x:y:w:h`
    Blur { region: String },
    Convert { container: String },
    Compress { target_size_mb: u64 },
    ExtractAudio,
    Thumbnail { timestamp: String },
}

impl MediaOperation {
    /// Extension of the file this step produces
    pub fn output_extension<'a>(&'a self, input_ext: &'a str) -> &'a str {
        match self {
            Self::Convert { container } => container,
            Self::ExtractAudio => "mp3",
            Self::Thumbnail { .. } => "jpg",
            _ => input_ext,
        }
    }
}

/// Post-processing seam used by the HTTP layer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessing: Send + Sync {
    /// Run one operation; false on any failure
    async fn apply(&self, operation: &MediaOperation, input: &Path, output: &Path) -> bool;

    /// ffprobe output as JSON; empty object on failure
    async fn probe(&self, path: &Path) -> serde_json::Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_extensions() {
        let convert = MediaOperation::Convert {
            container: "mp4".to_string(),
        };
        assert_eq!(convert.output_extension("webm"), "mp4");
        assert_eq!(MediaOperation::ExtractAudio.output_extension("mp4"), "mp3");
        let crop = MediaOperation::Crop {
            params: "iw:ih:0:0".to_string(),
        };
        assert_eq!(crop.output_extension("mkv"), "mkv");
    }
}
