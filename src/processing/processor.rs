// Media processor - named ffmpeg operations reporting success as bool

use async_trait::async_trait;
use std::path::Path;
use tracing::{info, warn};

use super::commands::{
    BlurRegion, CompressionTarget, MediaCommand, MediaCommandBuilder, DEFAULT_BLUR_REGION,
    DEFAULT_CROP, DEFAULT_RESOLUTION, DEFAULT_TARGET_SIZE_MB, DEFAULT_THUMBNAIL_AT,
};
use super::{MediaOperation, MediaProcessing, ProcessingError};
use crate::config::MediaConfig;
use crate::downloader::tools::locate_binary;

/// ffmpeg-backed media processor. Operations report success as bool.
#[derive(Debug, Clone)]
pub struct MediaProcessor {
    builder: MediaCommandBuilder,
}

impl MediaProcessor {
    pub fn new(config: &MediaConfig) -> Self {
        let ffmpeg = locate_binary("ffmpeg", config.ffmpeg_path.as_deref());
        let ffprobe = locate_binary("ffprobe", config.ffprobe_path.as_deref());
        Self {
            builder: MediaCommandBuilder::new(ffmpeg, ffprobe),
        }
    }

    pub async fn enhance_quality(&self, input: &Path, output: &Path, resolution: Option<&str>) -> bool {
        let operation = MediaOperation::Enhance {
            resolution: resolution.unwrap_or(DEFAULT_RESOLUTION).to_string(),
        };
        self.apply(&operation, input, output).await
    }

    pub async fn remove_watermark_by_cropping(&self, input: &Path, output: &Path, params: Option<&str>) -> bool {
        let operation = MediaOperation::Crop {
            params: params.unwrap_or(DEFAULT_CROP).to_string(),
        };
        self.apply(&operation, input, output).await
    }

    pub async fn remove_watermark_by_blurring(&self, input: &Path, output: &Path, region: Option<&str>) -> bool {
        let operation = MediaOperation::Blur {
            region: region.unwrap_or(DEFAULT_BLUR_REGION).to_string(),
        };
        self.apply(&operation, input, output).await
    }

    /// The container follows the output path; codecs are always libx264/aac
    pub async fn convert_format(&self, input: &Path, output: &Path, container: &str) -> bool {
        let operation = MediaOperation::Convert {
            container: container.to_string(),
        };
        self.apply(&operation, input, output).await
    }

    pub async fn compress_video(&self, input: &Path, output: &Path, target_size_mb: Option<u64>) -> bool {
        let operation = MediaOperation::Compress {
            target_size_mb: target_size_mb.unwrap_or(DEFAULT_TARGET_SIZE_MB),
        };
        self.apply(&operation, input, output).await
    }

    pub async fn extract_audio(&self, input: &Path, output: &Path) -> bool {
        self.apply(&MediaOperation::ExtractAudio, input, output).await
    }

    pub async fn create_thumbnail(&self, input: &Path, output: &Path, timestamp: Option<&str>) -> bool {
        let operation = MediaOperation::Thumbnail {
            timestamp: timestamp.unwrap_or(DEFAULT_THUMBNAIL_AT).to_string(),
        };
        self.apply(&operation, input, output).await
    }

    pub async fn get_video_metadata(&self, path: &Path) -> serde_json::Value {
        self.probe(path).await
    }

    async fn build(
        &self,
        operation: &MediaOperation,
        input: &Path,
        output: &Path,
    ) -> Result<MediaCommand, ProcessingError> {
        let command = match operation {
            MediaOperation::Enhance { resolution } => self.builder.enhance_quality(input, output, resolution),
            MediaOperation::Crop { params } => self.builder.crop(input, output, params),
            MediaOperation::Blur { region } => {
                let region = BlurRegion::parse(region)?;
                self.builder.blur(input, output, &region)
            }
            MediaOperation::Convert { .. } => self.builder.convert(input, output),
            MediaOperation::Compress { target_size_mb } => {
                let duration = probe_duration(&self.try_probe(input).await?);
                let target = CompressionTarget::for_size(*target_size_mb, duration)
                    .ok_or(ProcessingError::UnknownDuration)?;
                self.builder.compress(input, output, &target)
            }
            MediaOperation::ExtractAudio => self.builder.extract_audio(input, output),
            MediaOperation::Thumbnail { timestamp } => self.builder.thumbnail(input, output, timestamp),
        };
        Ok(command)
    }

    async fn try_probe(&self, path: &Path) -> Result<serde_json::Value, ProcessingError> {
        let stdout = self.builder.probe(path).execute().await?;
        serde_json::from_slice(&stdout)
            .map_err(|e| ProcessingError::InvalidParams(format!("ffprobe output is not JSON: {}", e)))
    }
}

/// `format.duration` from ffprobe JSON (a decimal string); 0 when missing
fn probe_duration(metadata: &serde_json::Value) -> f64 {
    let duration = &metadata["format"]["duration"];
    duration
        .as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| duration.as_f64())
        .unwrap_or(0.0)
}

#[async_trait]
impl MediaProcessing for MediaProcessor {
    async fn apply(&self, operation: &MediaOperation, input: &Path, output: &Path) -> bool {
        let result = match self.build(operation, input, output).await {
            Ok(command) => command.execute().await.map(|_| ()),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!(?operation, output = %output.display(), "media processing done");
                true
            }
            Err(e) => {
                warn!(?operation, input = %input.display(), error = %e, "media processing failed");
                false
            }
        }
    }

    async fn probe(&self, path: &Path) -> serde_json::Value {
        match self.try_probe(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ffprobe failed");
                serde_json::json!({})
            }
        }
    }
}
