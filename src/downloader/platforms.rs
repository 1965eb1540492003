// Platform registry and URL-based platform detection

use serde::Serialize;
use url::Url;

use super::format_selector::{FormatPolicy, FormatSelection};

/// Supported source platforms, in detection priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Tiktok,
    Instagram,
    Facebook,
    Twitter,
    Vimeo,
    Dailymotion,
}

/// Static description of a platform, as exposed by the API
#[derive(Debug, Serialize)]
pub struct PlatformInfo {
    #[serde(skip)]
    pub id: &'static str,
    pub domains: &'static [&'static str],
    pub name: &'static str,
    pub icon: &'static str,
}

/// Registry order is detection order: the first entry with a matching suffix wins.
pub const SUPPORTED_PLATFORMS: [Platform; 7] = [
    Platform::Youtube,
    Platform::Tiktok,
    Platform::Instagram,
    Platform::Facebook,
    Platform::Twitter,
    Platform::Vimeo,
    Platform::Dailymotion,
];

static REGISTRY: [PlatformInfo; 7] = [
    PlatformInfo {
        id: "youtube",
        domains: &["youtube.com", "youtu.be", "m.youtube.com"],
        name: "YouTube",
        icon: "youtube",
    },
    PlatformInfo {
        id: "tiktok",
        domains: &["tiktok.com", "vm.tiktok.com", "m.tiktok.com"],
        name: "TikTok",
        icon: "tiktok",
    },
    PlatformInfo {
        id: "instagram",
        domains: &["instagram.com", "instagr.am"],
        name: "Instagram",
        icon: "instagram",
    },
    PlatformInfo {
        id: "facebook",
        domains: &["facebook.com", "fb.watch", "m.facebook.com"],
        name: "Facebook",
        icon: "facebook",
    },
    PlatformInfo {
        id: "twitter",
        domains: &["twitter.com", "x.com", "t.co"],
        name: "Twitter/X",
        icon: "twitter",
    },
    PlatformInfo {
        id: "vimeo",
        domains: &["vimeo.com"],
        name: "Vimeo",
        icon: "vimeo",
    },
    PlatformInfo {
        id: "dailymotion",
        domains: &["dailymotion.com", "dai.ly"],
        name: "Dailymotion",
        icon: "dailymotion",
    },
];

impl Platform {
    pub fn info(self) -> &'static PlatformInfo {
        &REGISTRY[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.info().id
    }

    /// How raw extractor formats are filtered for this platform
    pub fn format_policy(self) -> FormatPolicy {
        match self {
            Self::Youtube => FormatPolicy::MergedByQuality,
            Self::Tiktok => FormatPolicy::WatermarkTagged,
            _ => FormatPolicy::AllVideo,
        }
    }

    /// yt-dlp format selection for a download request
    pub fn format_selection(self, quality: &str, container: &str) -> FormatSelection {
        match self {
            // Best-effort watermark avoidance: plain mp4 stream, recoded to mp4
            Self::Tiktok => FormatSelection {
                spec: "best[ext=mp4]/best".to_string(),
                recode_to: Some("mp4".to_string()),
            },
            _ => FormatSelection::for_request(quality, container),
        }
    }
}

/// Detect which platform a URL belongs to. Never fails: bad input yields `None`.
pub fn detect_platform(url: &str) -> Option<Platform> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    SUPPORTED_PLATFORMS
        .iter()
        .copied()
        .find(|platform| {
            platform
                .info()
                .domains
                .iter()
                .any(|domain| host.ends_with(domain))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_platforms() {
        assert_eq!(
            detect_platform("https://www.youtube.com/watch?v=x"),
            Some(Platform::Youtube)
        );
        assert_eq!(detect_platform("https://youtu.be/abc"), Some(Platform::Youtube));
        assert_eq!(detect_platform("https://vm.tiktok.com/abc"), Some(Platform::Tiktok));
        assert_eq!(
            detect_platform("https://www.instagram.com/reel/xyz/"),
            Some(Platform::Instagram)
        );
        assert_eq!(detect_platform("https://fb.watch/abc"), Some(Platform::Facebook));
        assert_eq!(detect_platform("https://x.com/user/status/1"), Some(Platform::Twitter));
        assert_eq!(detect_platform("https://vimeo.com/123"), Some(Platform::Vimeo));
        assert_eq!(detect_platform("https://dai.ly/x7"), Some(Platform::Dailymotion));
    }

    #[test]
    fn host_is_case_insensitive_and_ignores_port() {
        assert_eq!(
            detect_platform("HTTPS://WWW.YOUTUBE.COM:443/watch?v=x"),
            Some(Platform::Youtube)
        );
    }

    #[test]
    fn unknown_or_invalid_urls_yield_none() {
        assert_eq!(detect_platform("https://example.com"), None);
        assert_eq!(detect_platform("not a url"), None);
        assert_eq!(detect_platform(""), None);
        assert_eq!(detect_platform("mailto:someone@youtube.com"), None);
    }

    #[test]
    fn every_registered_suffix_maps_back_to_its_platform() {
        for platform in SUPPORTED_PLATFORMS {
            for domain in platform.info().domains {
                let url = format!("https://www.{}/video/1", domain);
                assert_eq!(detect_platform(&url), Some(platform), "{}", url);
            }
        }
    }

    #[test]
    fn registry_ids_are_unique() {
        let mut ids: Vec<&str> = SUPPORTED_PLATFORMS.iter().map(|p| p.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SUPPORTED_PLATFORMS.len());
    }

    #[test]
    fn tiktok_forces_mp4_selection() {
        let selection = Platform::Tiktok.format_selection("720p", "webm");
        assert_eq!(selection.spec, "best[ext=mp4]/best");
        assert_eq!(selection.recode_to.as_deref(), Some("mp4"));

        let selection = Platform::Vimeo.format_selection("best", "mp4");
        assert_eq!(selection.spec, "best[ext=mp4]/best[ext=mp4]/best");
        assert!(selection.recode_to.is_none());
    }
}
