// InfoExtractor module - video info extraction via yt-dlp
//
// The CLI extractor produces loosely-typed RawVideoInfo; platform policies
// (format_selector) and VideoMetadata normalization happen in the orchestrator.

mod cli;
pub mod diagnostics;
mod traits;

pub use cli::CliInfoExtractor;
pub use diagnostics::{diagnose_error, FailureReason};
#[cfg(test)]
pub use traits::MockInfoExtractor;
pub use traits::{InfoExtractor, RawFormat, RawVideoInfo};
