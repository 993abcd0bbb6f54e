/**
 * Downloader
 *
 * Fetches a URL, following redirects ourselves so the hop count is capped,
 * and streams the body into a file with per-chunk progress reporting.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::LOCATION;
use reqwest::{Client, Response, StatusCode, Url};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use crate::error::{Result, SetupError};

/// Redirect hops followed before giving up
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Download progress information
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub total: u64,
    pub percent: f64,
}

impl DownloadProgress {
    pub fn new(downloaded: u64, total: u64) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            (downloaded as f64 / total as f64) * 100.0
        };

        Self {
            downloaded,
            total,
            percent,
        }
    }
}

/// `User-Agent` sent with every request
pub fn default_user_agent() -> String {
    format!("ClassNoteAI-Setup/{}", env!("CARGO_PKG_VERSION"))
}

/// Create the HTTP client used for all downloads
///
/// Automatic redirects are off; `fetch` follows them.
pub fn build_client(user_agent: &str) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(30))
        .build()?;
    Ok(client)
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// GET `url`, following at most `max_redirects` redirect hops
///
/// Returns the final response only if it is `200 OK`.
pub async fn fetch(client: &Client, url: &str, max_redirects: usize) -> Result<Response> {
    let mut current = Url::parse(url).map_err(|e| SetupError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let mut redirects = 0;

    loop {
        let response = client.get(current.clone()).send().await?;
        let status = response.status();

        if is_redirect(status) {
            if redirects >= max_redirects {
                return Err(SetupError::TooManyRedirects {
                    limit: max_redirects,
                    url: url.to_string(),
                });
            }

            let location = response
                .headers()
                .get(LOCATION)
                .ok_or_else(|| SetupError::MissingLocation {
                    status,
                    url: current.to_string(),
                })?;
            let location = location.to_str().map_err(|e| SetupError::InvalidUrl {
                url: String::from_utf8_lossy(location.as_bytes()).into_owned(),
                reason: e.to_string(),
            })?;

            // Location may be relative to the URL that issued it
            let next = current.join(location).map_err(|e| SetupError::InvalidUrl {
                url: location.to_string(),
                reason: e.to_string(),
            })?;

            debug!("Redirect {} ({}) -> {}", current, status, next);
            current = next;
            redirects += 1;
            continue;
        }

        if status != StatusCode::OK {
            return Err(SetupError::HttpStatus {
                status,
                url: current.to_string(),
            });
        }

        return Ok(response);
    }
}

/// Download a file with progress reporting
///
/// The callback fires once per received chunk, and only when the server sent
/// a `Content-Length`.
pub async fn download_file<F>(
    client: &Client,
    url: &str,
    dest: &Path,
    max_redirects: usize,
    progress_callback: Option<F>,
) -> Result<PathBuf>
where
    F: Fn(DownloadProgress) + Send + Sync,
{
    // Ensure parent directory exists
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    info!("Downloading {} -> {:?}", url, dest);

    let response = fetch(client, url, max_redirects).await?;
    let total_size = response.content_length().filter(|size| *size > 0);

    match total_size {
        Some(size) => debug!("Content-Length: {} bytes ({:.2} MB)", size, size as f64 / 1_000_000.0),
        None => debug!("No Content-Length, progress will not be reported"),
    }

    let mut file = BufWriter::new(tokio::fs::File::create(dest).await?);
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(item) = stream.next().await {
        let chunk = item?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let (Some(total), Some(callback)) = (total_size, progress_callback.as_ref()) {
            callback(DownloadProgress::new(downloaded, total));
        }
    }

    file.flush().await?;
    drop(file);

    info!("Download complete: {:?} ({} bytes)", dest, downloaded);
    Ok(dest.to_path_buf())
}
