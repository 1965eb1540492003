// FormatSelector - unified format selection logic
//
// Two directions:
// - Raw formats from the InfoExtractor -> API format descriptors, filtered
//   per platform policy (plain video, merged+deduplicated, watermark-tagged)
// - Requested quality/container -> yt-dlp format selector for downloads

use super::extractors::RawFormat;
use super::models::FormatDescriptor;

/// Per-platform filtering of raw formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatPolicy {
    /// Every format carrying a video stream
    AllVideo,
    /// Only muxed audio+video formats, one per quality label (largest file wins)
    MergedByQuality,
    /// Video formats annotated with source URL and watermark flag
    WatermarkTagged,
}

/// Format ids that are served without the platform watermark
const NO_WATERMARK_FORMATS: [&str; 2] = ["play_addr", "download_addr"];

/// yt-dlp format request for a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelection {
    /// Value for `-f`
    pub spec: String,
    /// Container passed to `--recode-video`, if any
    pub recode_to: Option<String>,
}

impl FormatSelection {
    /// Requested quality in the requested container, then best of that container, then best
    pub fn for_request(quality: &str, container: &str) -> Self {
        let quality = FormatSelector::quality_selector(quality);
        Self {
            spec: format!(
                "{}[ext={}]/best[ext={}]/best",
                quality, container, container
            ),
            recode_to: None,
        }
    }
}

/// Format selector with quality label mapping
pub struct FormatSelector;

impl FormatSelector {
    /// Map a vertical resolution to its quality label
    pub fn quality_label(height: u64) -> &'static str {
        if height >= 2160 {
            "4K"
        } else if height >= 1440 {
            "1440p"
        } else if height >= 1080 {
            "1080p"
        } else if height >= 720 {
            "720p"
        } else if height >= 480 {
            "480p"
        } else if height >= 360 {
            "360p"
        } else {
            "240p"
        }
    }

    /// Height ceiling for a quality label, if it is one
    pub fn label_height(label: &str) -> Option<u32> {
        match label.to_ascii_lowercase().as_str() {
            "4k" | "2160p" => Some(2160),
            "1440p" => Some(1440),
            "1080p" => Some(1080),
            "720p" => Some(720),
            "480p" => Some(480),
            "360p" => Some(360),
            "240p" => Some(240),
            _ => None,
        }
    }

    /// Turn a requested quality into the leading yt-dlp selector term.
    /// Labels become height ceilings; anything else passes through as a selector/format id.
    pub fn quality_selector(quality: &str) -> String {
        let quality = quality.trim();
        if quality.is_empty() {
            return "best".to_string();
        }
        match Self::label_height(quality) {
            Some(height) => format!("best[height<={}]", height),
            None => quality.to_string(),
        }
    }

    /// Filter raw formats according to the platform policy
    pub fn select_formats(formats: &[RawFormat], policy: FormatPolicy) -> Vec<FormatDescriptor> {
        match policy {
            FormatPolicy::AllVideo => formats
                .iter()
                .filter(|f| f.has_video())
                .map(|f| Self::describe(f, false))
                .collect(),
            FormatPolicy::WatermarkTagged => formats
                .iter()
                .filter(|f| f.has_video())
                .map(|f| Self::describe(f, true))
                .collect(),
            FormatPolicy::MergedByQuality => Self::merge_by_quality(formats),
        }
    }

    /// Whether a format id is expected to carry the platform watermark
    pub fn has_watermark(format_id: &str) -> bool {
        !NO_WATERMARK_FORMATS
            .iter()
            .any(|marker| format_id.contains(marker))
    }

    fn describe(format: &RawFormat, tagged: bool) -> FormatDescriptor {
        FormatDescriptor {
            format_id: format.format_id.clone(),
            ext: format.ext.clone(),
            quality: format
                .format_note
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            resolution: format
                .resolution
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            filesize: format.filesize,
            fps: format.fps,
            vcodec: format.vcodec.clone(),
            acodec: format.acodec.clone(),
            url: if tagged { format.url.clone() } else { None },
            has_watermark: if tagged {
                Some(Self::has_watermark(&format.format_id))
            } else {
                None
            },
        }
    }

    /// One muxed format per quality label; output keeps first-seen label order
    fn merge_by_quality(formats: &[RawFormat]) -> Vec<FormatDescriptor> {
        let mut by_label: Vec<(&'static str, &RawFormat)> = Vec::new();

        for format in formats.iter().filter(|f| f.has_video() && f.has_audio()) {
            let label = Self::quality_label(format.height.unwrap_or(0));
            match by_label.iter_mut().find(|(l, _)| *l == label) {
                Some(slot) => {
                    if format.filesize.unwrap_or(0) > slot.1.filesize.unwrap_or(0) {
                        slot.1 = format;
                    }
                }
                None => by_label.push((label, format)),
            }
        }

        by_label
            .into_iter()
            .map(|(label, f)| FormatDescriptor {
                format_id: f.format_id.clone(),
                ext: f.ext.clone(),
                quality: label.to_string(),
                resolution: format!("{}x{}", f.width.unwrap_or(0), f.height.unwrap_or(0)),
                filesize: f.filesize,
                fps: f.fps,
                vcodec: f.vcodec.clone(),
                acodec: f.acodec.clone(),
                url: f.url.clone(),
                has_watermark: None,
            })
            .collect()
    }
}
