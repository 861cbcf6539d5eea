//! Loading calendar text from a local file or an http(s) URL.
//!
//! Downloads are cached under the user cache directory and reused while
//! younger than the configured TTL. Fetching never fails: a stale cache is
//! used when the download fails, and empty text when there is nothing at all.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Result, bail};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("nudge/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarSource {
    File(PathBuf),
    Url(String),
}

impl CalendarSource {
    pub fn parse(source: &str) -> Self {
        let lower = source.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            CalendarSource::Url(source.to_string())
        } else if let Some(rest) = lower.strip_prefix("webcal://") {
            CalendarSource::Url(format!("https://{}", &source[source.len() - rest.len()..]))
        } else {
            CalendarSource::File(PathBuf::from(source))
        }
    }

    /// Read the calendar text, logging and swallowing every failure.
    pub async fn fetch_text(&self, cache_ttl: Duration) -> String {
        match self {
            CalendarSource::File(path) => match tokio::fs::read_to_string(path).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read calendar file");
                    String::new()
                }
            },
            CalendarSource::Url(url) => match cache_dir() {
                Some(dir) => fetch_url_cached(url, &dir, cache_ttl).await,
                None => fetch_url(url).await.unwrap_or_else(|e| {
                    warn!(%url, error = %e, "could not download calendar");
                    String::new()
                }),
            },
        }
    }
}

impl fmt::Display for CalendarSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarSource::File(path) => write!(f, "{}", path.display()),
            CalendarSource::Url(url) => f.write_str(url),
        }
    }
}

fn cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("nudge"))
}

/// Cache file for a URL: the hex sha256 of the URL.
fn cache_path(dir: &Path, url: &str) -> PathBuf {
    dir.join(format!("{:x}.ics", Sha256::digest(url.as_bytes())))
}

#[derive(Debug, PartialEq, Eq)]
enum Cached {
    Fresh(String),
    Stale(String),
    Missing,
}

async fn read_cache(path: &Path, ttl: Duration) -> Cached {
    let Ok(metadata) = tokio::fs::metadata(path).await else {
        return Cached::Missing;
    };
    let Ok(text) = tokio::fs::read_to_string(path).await else {
        return Cached::Missing;
    };

    let age = metadata
        .modified()
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok());

    match age {
        Some(age) if age < ttl => Cached::Fresh(text),
        _ => Cached::Stale(text),
    }
}

async fn fetch_url_cached(url: &str, dir: &Path, ttl: Duration) -> String {
    let path = cache_path(dir, url);

    let stale = match read_cache(&path, ttl).await {
        Cached::Fresh(text) => {
            debug!(%url, "using cached calendar");
            return text;
        }
        Cached::Stale(text) => Some(text),
        Cached::Missing => None,
    };

    match fetch_url(url).await {
        Ok(text) => {
            if let Err(e) = write_cache(&path, &text).await {
                warn!(path = %path.display(), error = %e, "could not cache calendar");
            }
            text
        }
        Err(e) => {
            warn!(%url, error = %e, "could not download calendar");
            stale.unwrap_or_default()
        }
    }
}

async fn write_cache(path: &Path, text: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, text).await
}

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

async fn fetch_url(url: &str) -> Result<String> {
    let client = http_client()?;
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        bail!("Calendar download failed (HTTP {})", response.status());
    }

    Ok(response.text().await?)
}
