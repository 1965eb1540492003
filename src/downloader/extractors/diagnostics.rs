// Failure diagnostics - classifies yt-dlp error output
//
// The API only surfaces a flat error string; this adds a coarse reason
// so clients (and logs) can tell a geo-block from a dead link.

use serde::{Deserialize, Serialize};

/// Reasons why an extraction or download might fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// HTTP 403 Forbidden - general access denied
    Http403Forbidden,
    /// Geographic restriction
    GeoBlocked,
    /// Private content requiring authorization
    PrivateVideo,
    /// Deleted, removed or otherwise gone
    VideoUnavailable,
    /// Rate limiting (429 or similar)
    RateLimited,
    /// Platform wants a logged-in session (age gate, login wall)
    LoginRequired,
    /// yt-dlp has no extractor for this URL
    UnsupportedUrl,
    /// Network timeout
    NetworkTimeout,
}

impl FailureReason {
    /// Check if retrying later could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http403Forbidden | Self::RateLimited | Self::NetworkTimeout
        )
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::GeoBlocked => "Geographic restriction",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::RateLimited => "Rate limited by the platform",
            Self::LoginRequired => "Login required",
            Self::UnsupportedUrl => "URL not supported by the extractor",
            Self::NetworkTimeout => "Network timeout",
        }
    }
}

/// Ordered: more specific patterns first
const PATTERNS: &[(FailureReason, &[&str])] = &[
    (
        FailureReason::GeoBlocked,
        &[
            "available in your country",
            "blocked in your country",
            "geographic restriction",
            "geo restrict",
            "geo-restrict",
        ],
    ),
    (
        FailureReason::PrivateVideo,
        &["private video", "this video is private", "this account is private"],
    ),
    (
        FailureReason::LoginRequired,
        &[
            "sign in to confirm your age",
            "login required",
            "requires authentication",
            "use --cookies",
            "log in to",
        ],
    ),
    (
        FailureReason::RateLimited,
        &["http error 429", "too many requests", "rate-limit", "rate limit"],
    ),
    (FailureReason::Http403Forbidden, &["http error 403", "forbidden"]),
    (FailureReason::UnsupportedUrl, &["unsupported url"]),
    (
        FailureReason::VideoUnavailable,
        &[
            "video unavailable",
            "has been removed",
            "no longer available",
            "http error 404",
            "does not exist",
        ],
    ),
    (FailureReason::NetworkTimeout, &["timed out", "timeout"]),
];

/// Map raw tool output to a failure reason, if any pattern matches
pub fn diagnose_error(output: &str) -> Option<FailureReason> {
    let lower = output.to_lowercase();
    PATTERNS
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(reason, _)| *reason)
}
