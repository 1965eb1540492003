// ffmpeg / ffprobe command templates

use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use super::ProcessingError;

pub const DEFAULT_RESOLUTION: &str = "1920x1080";
pub const DEFAULT_CROP: &str = "iw-200:ih-100:100:50";
pub const DEFAULT_BLUR_REGION: &str = "100:50:200:100";
pub const DEFAULT_THUMBNAIL_AT: &str = "00:00:01";
pub const DEFAULT_TARGET_SIZE_MB: u64 = 50;

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Overwrite flag plus the output path; always last
    pub fn overwrite_output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-y").arg(path.as_ref().to_string_lossy().to_string())
    }

    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    pub fn audio_bitrate<S: Into<String>>(self, bitrate: S) -> Self {
        self.arg("-b:a").arg(bitrate)
    }

    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Run and return stdout; non-zero exit is an error carrying stderr
    pub async fn execute(&self) -> Result<Vec<u8>, ProcessingError> {
        debug!(program = %self.binary_path, args = ?self.args, "{}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProcessingError::ToolNotFound(self.binary_path.clone())
                } else {
                    ProcessingError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(3).collect();
            return Err(ProcessingError::Failed {
                description: self.description.clone(),
                stderr: tail.into_iter().rev().collect::<Vec<_>>().join("\n"),
            });
        }

        Ok(output.stdout)
    }
}

/// Rectangle for the blur filter, written `x:y:w:h`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlurRegion {
    pub x: String,
    pub y: String,
    pub w: String,
    pub h: String,
}

impl BlurRegion {
    pub fn parse(region: &str) -> Result<Self, ProcessingError> {
        let parts: Vec<&str> = region.split(':').map(str::trim).collect();
        match parts.as_slice() {
            [x, y, w, h] if parts.iter().all(|p| !p.is_empty()) => Ok(Self {
                x: x.to_string(),
                y: y.to_string(),
                w: w.to_string(),
                h: h.to_string(),
            }),
            _ => Err(ProcessingError::InvalidParams(format!(
                "blur region must be x:y:w:h, got '{}'",
                region
            ))),
        }
    }

    fn filter(&self) -> String {
        format!(
            "boxblur=enable='between(t,0,999)':x={}:y={}:w={}:h={}:blur_radius=10",
            self.x, self.y, self.w, self.h
        )
    }
}

/// Bitrate plan for size-targeted compression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionTarget {
    /// Target video bitrate in kbps
    pub bitrate_kbps: u64,
}

impl CompressionTarget {
    /// `floor(size_mb * 8 * 1024 / duration)`; `None` when the duration is unknown
    pub fn for_size(target_size_mb: u64, duration_secs: f64) -> Option<Self> {
        if !(duration_secs > 0.0) || !duration_secs.is_finite() {
            return None;
        }
        let bitrate = (target_size_mb as f64 * 8.0 * 1024.0 / duration_secs).floor();
        Some(Self {
            bitrate_kbps: bitrate as u64,
        })
    }

    pub fn bitrate(&self) -> String {
        format!("{}k", self.bitrate_kbps)
    }

    /// 1.2x the target, printed with a fractional part ("4915.2k", "1200.0k")
    pub fn maxrate(&self) -> String {
        format!("{:?}k", self.bitrate_kbps as f64 * 1.2)
    }

    pub fn bufsize(&self) -> String {
        format!("{}k", self.bitrate_kbps * 2)
    }
}

/// Builder for the ffmpeg/ffprobe command templates
#[derive(Debug, Clone)]
pub struct MediaCommandBuilder {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl MediaCommandBuilder {
    pub fn new<S1: Into<String>, S2: Into<String>>(ffmpeg_path: S1, ffprobe_path: S2) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    fn ffmpeg<P: AsRef<Path>>(&self, description: &str, input: P) -> MediaCommand {
        MediaCommand::new(&self.ffmpeg_path, description).input(input)
    }

    pub fn enhance_quality<P: AsRef<Path>>(&self, input: P, output: P, resolution: &str) -> MediaCommand {
        self.ffmpeg("Quality enhancement", input)
            .video_filter(format!("scale={}:flags=lanczos", resolution))
            .video_codec("libx264")
            .args(["-preset", "medium", "-crf", "18"])
            .audio_codec("aac")
            .audio_bitrate("192k")
            .overwrite_output(output)
    }

    pub fn crop<P: AsRef<Path>>(&self, input: P, output: P, params: &str) -> MediaCommand {
        self.ffmpeg("Watermark crop", input)
            .video_filter(format!("crop={}", params))
            .copy_audio()
            .overwrite_output(output)
    }

    pub fn blur<P: AsRef<Path>>(&self, input: P, output: P, region: &BlurRegion) -> MediaCommand {
        self.ffmpeg("Watermark blur", input)
            .video_filter(region.filter())
            .copy_audio()
            .overwrite_output(output)
    }

    pub fn convert<P: AsRef<Path>>(&self, input: P, output: P) -> MediaCommand {
        self.ffmpeg("Format conversion", input)
            .video_codec("libx264")
            .audio_codec("aac")
            .overwrite_output(output)
    }

    pub fn compress<P: AsRef<Path>>(&self, input: P, output: P, target: &CompressionTarget) -> MediaCommand {
        self.ffmpeg("Size-targeted compression", input)
            .arg("-b:v")
            .arg(target.bitrate())
            .arg("-maxrate")
            .arg(target.maxrate())
            .arg("-bufsize")
            .arg(target.bufsize())
            .video_codec("libx264")
            .args(["-preset", "medium"])
            .audio_codec("aac")
            .audio_bitrate("128k")
            .overwrite_output(output)
    }

    pub fn extract_audio<P: AsRef<Path>>(&self, input: P, output: P) -> MediaCommand {
        self.ffmpeg("Audio extraction", input)
            .args(["-vn", "-acodec", "mp3", "-ab", "192k"])
            .overwrite_output(output)
    }

    pub fn thumbnail<P: AsRef<Path>>(&self, input: P, output: P, timestamp: &str) -> MediaCommand {
        self.ffmpeg("Thumbnail capture", input)
            .arg("-ss")
            .arg(timestamp)
            .args(["-vframes", "1"])
            .overwrite_output(output)
    }

    pub fn probe<P: AsRef<Path>>(&self, path: P) -> MediaCommand {
        MediaCommand::new(&self.ffprobe_path, "Metadata probe")
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path.as_ref().to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> MediaCommandBuilder {
        MediaCommandBuilder::new("ffmpeg", "ffprobe")
    }

    #[test]
    fn compression_bitrates() {
        let target = CompressionTarget::for_size(50, 100.0).unwrap();
        assert_eq!(target.bitrate_kbps, 4096);
        assert_eq!(target.bitrate(), "4096k");
        assert_eq!(target.maxrate(), "4915.2k");
        assert_eq!(target.bufsize(), "8192k");
    }

    #[test]
    fn compression_rounds_down_and_keeps_fraction_marker() {
        let target = CompressionTarget::for_size(1, 3.0).unwrap();
        assert_eq!(target.bitrate_kbps, 2730);
        let target = CompressionTarget { bitrate_kbps: 1000 };
        assert_eq!(target.maxrate(), "1200.0k");
    }

    #[test]
    fn compression_needs_duration() {
        assert!(CompressionTarget::for_size(50, 0.0).is_none());
        assert!(CompressionTarget::for_size(50, -1.0).is_none());
        assert!(CompressionTarget::for_size(50, f64::NAN).is_none());
    }

    #[test]
    fn enhance_template() {
        let cmd = builder().enhance_quality("in.mp4", "out.mp4", DEFAULT_RESOLUTION);
        assert_eq!(cmd.binary_path, "ffmpeg");
        assert_eq!(
            cmd.args,
            vec![
                "-i", "in.mp4", "-vf", "scale=1920x1080:flags=lanczos", "-c:v", "libx264",
                "-preset", "medium", "-crf", "18", "-c:a", "aac", "-b:a", "192k", "-y", "out.mp4"
            ]
        );
    }

    #[test]
    fn crop_and_convert_templates() {
        let cmd = builder().crop("in.mp4", "out.mp4", DEFAULT_CROP);
        assert_eq!(
            cmd.args,
            vec!["-i", "in.mp4", "-vf", "crop=iw-200:ih-100:100:50", "-c:a", "copy", "-y", "out.mp4"]
        );

        let cmd = builder().convert("in.webm", "out.mp4");
        assert_eq!(
            cmd.args,
            vec!["-i", "in.webm", "-c:v", "libx264", "-c:a", "aac", "-y", "out.mp4"]
        );
    }

    #[test]
    fn blur_template() {
        let region = BlurRegion::parse(DEFAULT_BLUR_REGION).unwrap();
        let cmd = builder().blur("in.mp4", "out.mp4", &region);
        assert_eq!(
            cmd.args[3],
            "boxblur=enable='between(t,0,999)':x=100:y=50:w=200:h=100:blur_radius=10"
        );
        assert_eq!(&cmd.args[4..], &["-c:a", "copy", "-y", "out.mp4"]);
    }

    #[test]
    fn malformed_blur_region() {
        assert!(BlurRegion::parse("100:50:200").is_err());
        assert!(BlurRegion::parse("1:2:3:4:5").is_err());
        assert!(BlurRegion::parse("1::3:4").is_err());
    }

    #[test]
    fn compress_template() {
        let target = CompressionTarget::for_size(50, 100.0).unwrap();
        let cmd = builder().compress("in.mp4", "out.mp4", &target);
        assert_eq!(
            cmd.args,
            vec![
                "-i", "in.mp4", "-b:v", "4096k", "-maxrate", "4915.2k", "-bufsize", "8192k",
                "-c:v", "libx264", "-preset", "medium", "-c:a", "aac", "-b:a", "128k", "-y",
                "out.mp4"
            ]
        );
    }

    #[test]
    fn audio_thumbnail_probe_templates() {
        let cmd = builder().extract_audio("in.mp4", "out.mp3");
        assert_eq!(
            cmd.args,
            vec!["-i", "in.mp4", "-vn", "-acodec", "mp3", "-ab", "192k", "-y", "out.mp3"]
        );

        let cmd = builder().thumbnail("in.mp4", "thumb.jpg", DEFAULT_THUMBNAIL_AT);
        assert_eq!(
            cmd.args,
            vec!["-i", "in.mp4", "-ss", "00:00:01", "-vframes", "1", "-y", "thumb.jpg"]
        );

        let cmd = builder().probe("in.mp4");
        assert_eq!(cmd.binary_path, "ffprobe");
        assert_eq!(
            cmd.args,
            vec!["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams", "in.mp4"]
        );
    }
}
