// Platform presets for post-processing downloaded videos

use std::path::{Path, PathBuf};

use super::{MediaOperation, MediaProcessing};
use crate::downloader::Platform;
use crate::processing::commands::DEFAULT_RESOLUTION;

/// Crop that trims the bottom-right corner where short-form watermarks sit
const TIKTOK_CROP: &str = "iw-150:ih-80:0:0";

/// Fixed preset table; `None` means the platform's files are used as-is
pub fn preset_for(platform: Platform) -> Option<MediaOperation> {
    match platform {
        Platform::Tiktok => Some(MediaOperation::Crop {
            params: TIKTOK_CROP.to_string(),
        }),
        Platform::Instagram | Platform::Youtube => Some(MediaOperation::Convert {
            container: "mp4".to_string(),
        }),
        Platform::Facebook | Platform::Twitter => Some(MediaOperation::Enhance {
            resolution: DEFAULT_RESOLUTION.to_string(),
        }),
        Platform::Vimeo | Platform::Dailymotion => None,
    }
}

/// `<dir>/<stem>_processed.<ext>` next to the input
pub fn processed_path(input: &Path, operation: &MediaOperation) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    let input_ext = input.extension().and_then(|e| e.to_str()).unwrap_or("mp4");
    let ext = operation.output_extension(input_ext);
    input.with_file_name(format!("{}_processed.{}", stem, ext))
}

/// Run the platform preset. Returns the processed file, or `None` when the
/// platform has no preset or processing failed.
pub async fn apply_preset(
    processor: &dyn MediaProcessing,
    platform: Platform,
    input: &Path,
) -> Option<PathBuf> {
    let operation = preset_for(platform)?;
    let output = processed_path(input, &operation);

    if processor.apply(&operation, input, &output).await && output.is_file() {
        Some(output)
    } else {
        None
    }
}
