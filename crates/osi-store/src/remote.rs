//! Remote retrieval of definitions, archives and the schema.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::{Result, StoreError};

/// User agent string for download requests.
const USER_AGENT_VALUE: &str = concat!("osi/", env!("CARGO_PKG_VERSION"));

/// Fetches raw bytes from a URL.
///
/// Implementations must report a missing resource as [`StoreError::RemoteNotFound`]
/// so callers can tell it apart from transport failures.
pub trait RemoteSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

impl<T: RemoteSource + ?Sized> RemoteSource for Box<T> {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url)
    }
}

/// Blocking HTTP source.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::remote("<client>", format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl RemoteSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "fetching remote resource");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| StoreError::remote(url, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::RemoteNotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(StoreError::remote(
                url,
                format!("request failed with status {status}"),
            ));
        }

        let body = response.bytes().map_err(|e| StoreError::remote(url, e))?;
        tracing::debug!(url, bytes = body.len(), "fetch complete");
        Ok(body.to_vec())
    }
}

/// Source that never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl RemoteSource for OfflineSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Err(StoreError::Offline {
            url: url.to_string(),
        })
    }
}

/// Joins a base URL and path segments with single slashes.
pub(crate) fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(segment.trim_matches('/'));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(HttpSource::new().is_ok());
    }

    #[test]
    fn offline_source_refuses() {
        let err = OfflineSource.fetch("https://example.org/a.json").unwrap_err();
        assert!(matches!(err, StoreError::Offline { .. }));
    }

    #[test]
    fn joins_without_double_slashes() {
        assert_eq!(
            join_url("https://example.org/defs/", &["v1", "a", "arbo.json"]),
            "https://example.org/defs/v1/a/arbo.json"
        );
    }
}
