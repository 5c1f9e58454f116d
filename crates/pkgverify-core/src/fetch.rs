//! Artifact fetching: one streaming HTTP GET into a local file.
//!
//! The body is written to a temp file next to the destination and renamed
//! into place only after a 2xx response completed, so a failed fetch never
//! leaves a partial or empty artifact behind to be hashed later. There is no
//! retry; each call is a single attempt.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::FetchConfig;

/// Errors from fetching one artifact.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("GET {url} timed out: {source}")]
    Timeout {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("GET {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("GET {url} returned HTTP {code}")]
    Status { url: String, code: u32 },
    /// The local destination could not be written. Not specific to one package.
    #[error("cannot store download at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TransportError {
    /// Whether local storage failed (as opposed to the remote side).
    pub fn is_storage(&self) -> bool {
        matches!(self, TransportError::Storage { .. })
    }
}

/// Fetches a URL into a local file.
pub trait Transport {
    /// Download `url` to `dest`, returning the number of body bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, TransportError> {
        (**self).fetch(url, dest)
    }
}

/// Timeouts and redirect limit for [`CurlTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    /// Whole-transfer limit.
    pub timeout: Duration,
    pub max_redirections: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for FetchOptions {
    fn from(cfg: &FetchConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            max_redirections: cfg.max_redirections,
        }
    }
}

/// libcurl-backed transport (http and https only).
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    opts: FetchOptions,
}

impl CurlTransport {
    pub fn new(opts: FetchOptions) -> Self {
        Self { opts }
    }
}

impl Transport for CurlTransport {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, TransportError> {
        check_url(url)?;

        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let storage = |source: io::Error| TransportError::Storage {
            path: dest.to_path_buf(),
            source,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(storage)?;

        let curl_err = |source: curl::Error| classify_curl(url, source);
        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(curl_err)?;
        easy.get(true).map_err(curl_err)?;
        easy.follow_location(true).map_err(curl_err)?;
        easy.max_redirections(self.opts.max_redirections)
            .map_err(curl_err)?;
        easy.connect_timeout(self.opts.connect_timeout)
            .map_err(curl_err)?;
        easy.timeout(self.opts.timeout).map_err(curl_err)?;

        let mut written: u64 = 0;
        let mut write_err: Option<io::Error> = None;
        let performed = {
            let file = tmp.as_file_mut();
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match file.write_all(data) {
                    Ok(()) => {
                        written += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        write_err = Some(e);
                        Ok(0) // abort transfer
                    }
                })
                .map_err(curl_err)?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(storage(e));
        }
        performed.map_err(curl_err)?;

        let code = easy.response_code().map_err(curl_err)?;
        if !(200..300).contains(&code) {
            tracing::warn!(url, code, "artifact fetch rejected");
            return Err(TransportError::Status {
                url: url.to_string(),
                code,
            });
        }

        tmp.as_file_mut().flush().map_err(storage)?;
        tmp.persist(dest).map_err(|e| storage(e.error))?;
        tracing::debug!(url, dest = %dest.display(), bytes = written, "artifact fetched");
        Ok(written)
    }
}

fn check_url(url: &str) -> Result<(), TransportError> {
    let parsed = url::Url::parse(url).map_err(|e| TransportError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(TransportError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn classify_curl(url: &str, source: curl::Error) -> TransportError {
    if source.is_operation_timedout() {
        TransportError::Timeout {
            url: url.to_string(),
            source,
        }
    } else {
        TransportError::Connection {
            url: url.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_url_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out");
        let err = CurlTransport::default()
            .fetch("not a url", &dest)
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn rejects_non_http_schemes() {
        let dir = tempfile::tempdir().unwrap();
        let err = CurlTransport::default()
            .fetch("file:///etc/passwd", &dir.path().join("out"))
            .unwrap_err();
        match err {
            TransportError::InvalidUrl { reason, .. } => assert!(reason.contains("file")),
            other => panic!("expected InvalidUrl, got {other:?}"),
        }
    }

    #[test]
    fn options_follow_config() {
        let cfg = FetchConfig {
            connect_timeout_secs: 3,
            timeout_secs: 9,
            max_redirections: 2,
        };
        let opts = FetchOptions::from(&cfg);
        assert_eq!(opts.connect_timeout, Duration::from_secs(3));
        assert_eq!(opts.timeout, Duration::from_secs(9));
        assert_eq!(opts.max_redirections, 2);
    }

    #[test]
    fn storage_errors_are_flagged() {
        let err = TransportError::Storage {
            path: PathBuf::from("x"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_storage());
        let status = TransportError::Status {
            url: "http://h/".to_string(),
            code: 404,
        };
        assert!(!status.is_storage());
        assert_eq!(status.to_string(), "GET http://h/ returned HTTP 404");
    }
}
