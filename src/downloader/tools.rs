// External tool detection - yt-dlp, ffmpeg, ffprobe

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
    Ffprobe,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
            ToolType::Ffprobe => "ffprobe",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "--version",
            // ffmpeg family uses a single dash
            ToolType::Ffmpeg | ToolType::Ffprobe => "-version",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub tool_type: ToolType,
    pub version: Option<String>,
    pub path: Option<String>,
    pub is_available: bool,
}

/// Resolve a binary: explicit override, then common install dirs, then `which`.
/// Falls back to the bare name so spawning still goes through PATH.
pub fn locate_binary(binary_name: &str, explicit: Option<&str>) -> String {
    if let Some(path) = explicit {
        return path.to_string();
    }
    find_installed(binary_name).unwrap_or_else(|| binary_name.to_string())
}

fn find_installed(binary_name: &str) -> Option<String> {
    let common_paths = [
        format!("/opt/homebrew/bin/{}", binary_name),
        format!("/usr/local/bin/{}", binary_name),
        format!("/usr/bin/{}", binary_name),
    ];

    if let Some(path) = common_paths.into_iter().find(|p| Path::new(p).exists()) {
        return Some(path);
    }

    let output = Command::new("which").arg(binary_name).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!path.is_empty()).then_some(path)
}

/// Tool status reporting for the configured binaries
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    ytdlp_path: Option<String>,
    ffmpeg_path: Option<String>,
    ffprobe_path: Option<String>,
}

impl ToolManager {
    pub fn new(
        ytdlp_path: Option<String>,
        ffmpeg_path: Option<String>,
        ffprobe_path: Option<String>,
    ) -> Self {
        Self {
            ytdlp_path,
            ffmpeg_path,
            ffprobe_path,
        }
    }

    fn explicit_path(&self, tool_type: ToolType) -> Option<&str> {
        match tool_type {
            ToolType::YtDlp => self.ytdlp_path.as_deref(),
            ToolType::Ffmpeg => self.ffmpeg_path.as_deref(),
            ToolType::Ffprobe => self.ffprobe_path.as_deref(),
        }
    }

    pub fn get_tool_info(&self, tool_type: ToolType) -> ToolInfo {
        let path = match self.explicit_path(tool_type) {
            Some(explicit) => Some(explicit.to_string()),
            None => find_installed(tool_type.as_str()),
        };
        let version = path.as_deref().and_then(|p| get_version(p, tool_type));

        ToolInfo {
            name: tool_type.as_str().to_string(),
            tool_type,
            // A configured path that does not run is not available
            is_available: version.is_some(),
            version,
            path,
        }
    }

    pub fn get_all_tools(&self) -> Vec<ToolInfo> {
        [ToolType::YtDlp, ToolType::Ffmpeg, ToolType::Ffprobe]
            .into_iter()
            .map(|tool| self.get_tool_info(tool))
            .collect()
    }
}

fn get_version(path: &str, tool_type: ToolType) -> Option<String> {
    match Command::new(path).arg(tool_type.version_arg()).output() {
        Ok(output) if output.status.success() => {
            let out = String::from_utf8_lossy(&output.stdout);
            parse_version(tool_type, &out)
        }
        _ => None,
    }
}

/// yt-dlp prints a bare version; ffmpeg prints "ffmpeg version 6.1.1 Copyright ..."
fn parse_version(tool_type: ToolType, output: &str) -> Option<String> {
    let first_line = output.lines().next()?.trim();
    if first_line.is_empty() {
        return None;
    }
    match tool_type {
        ToolType::YtDlp => Some(first_line.to_string()),
        ToolType::Ffmpeg | ToolType::Ffprobe => first_line
            .split_whitespace()
            .skip_while(|word| *word != "version")
            .nth(1)
            .map(|v| v.to_string())
            .or_else(|| Some(first_line.to_string())),
    }
}
