/**
 * Error Module
 *
 * Every failure the setup pipeline can hit. All of them are terminal for a
 * single invocation; nothing is retried.
 */
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SetupError>;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Unsupported platform: {key}. Supported platforms: {}", .supported.join(", "))]
    UnsupportedPlatform {
        key: String,
        supported: Vec<&'static str>,
    },

    #[error("Download failed: HTTP {status} ({url})")]
    HttpStatus { status: StatusCode, url: String },

    #[error("Too many redirects (limit {limit}) while fetching {url}")]
    TooManyRedirects { limit: usize, url: String },

    #[error("Redirect ({status}) from {url} has no Location header")]
    MissingLocation { status: StatusCode, url: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Archive entry that would escape the destination directory
    #[error("Refusing to extract unsafe archive entry: {path}")]
    UnsafeEntry { path: String },

    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
