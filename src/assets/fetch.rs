use std::sync::Arc;
use std::time::Duration;

use crate::assets::data_url::{decode_data_url, is_data_url};
use crate::foundation::error::{CollageError, CollageResult};

/// Bytes of a fetched resource plus its declared media type.
#[derive(Clone, Debug)]
pub struct FetchedResource {
    /// Raw response body.
    pub bytes: Vec<u8>,
    /// `Content-Type` value, if the source declared one.
    pub content_type: Option<String>,
}

impl FetchedResource {
    /// Create a fetched resource.
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }
}

/// Retrieves the bytes behind an image source locator.
///
/// Implementations are shared across fetch workers, so they must be `Send + Sync`.
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the resource at `url`. Failures are reported as [`CollageError::AssetFetch`].
    fn fetch(&self, url: &str) -> CollageResult<FetchedResource>;
}

impl<T: ResourceFetcher + ?Sized> ResourceFetcher for Arc<T> {
    fn fetch(&self, url: &str) -> CollageResult<FetchedResource> {
        (**self).fetch(url)
    }
}

impl<T: ResourceFetcher + ?Sized> ResourceFetcher for &T {
    fn fetch(&self, url: &str) -> CollageResult<FetchedResource> {
        (**self).fetch(url)
    }
}

/// Default fetcher: plain HTTP(S) GET, `file://` URLs, `data:` URLs and bare filesystem paths.
///
/// No headers are added and nothing is retried. There is no timeout unless one is configured.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    timeout: Option<Duration>,
    max_size: u64,
}

impl HttpFetcher {
    /// Create a fetcher with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every HTTP request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reject response bodies larger than `max_size` bytes.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    fn fetch_http(&self, url: &str) -> CollageResult<FetchedResource> {
        let config = ureq::Agent::config_builder()
            .timeout_global(self.timeout)
            .build();
        let agent: ureq::Agent = config.into();

        let mut response = agent
            .get(url)
            .call()
            .map_err(|e| CollageError::asset_fetch(url, e.to_string()))?;

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|h| h.to_str().ok())
            .map(str::to_owned);

        let bytes = response
            .body_mut()
            .with_config()
            .limit(self.max_size)
            .read_to_vec()
            .map_err(|e| CollageError::asset_fetch(url, e.to_string()))?;
        if bytes.is_empty() {
            return Err(CollageError::asset_fetch(url, "empty response body"));
        }
        Ok(FetchedResource::new(bytes, content_type))
    }

    fn fetch_file(&self, url: &str) -> CollageResult<FetchedResource> {
        let path = match url.strip_prefix("file://") {
            Some(rest) => url::Url::parse(url)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .unwrap_or_else(|| rest.into()),
            None => url.into(),
        };
        let bytes = std::fs::read(path).map_err(|e| CollageError::asset_fetch(url, e.to_string()))?;
        Ok(FetchedResource::new(bytes, None))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            timeout: None,
            max_size: 64 * 1024 * 1024,
        }
    }
}

impl ResourceFetcher for HttpFetcher {
    #[tracing::instrument(level = "debug", skip_all, fields(url = %truncate_for_log(url)))]
    fn fetch(&self, url: &str) -> CollageResult<FetchedResource> {
        if is_data_url(url) {
            let (bytes, content_type) = decode_data_url(url)
                .map_err(|e| CollageError::asset_fetch(truncate_for_log(url), e.to_string()))?;
            Ok(FetchedResource::new(bytes, content_type))
        } else if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_http(url)
        } else {
            self.fetch_file(url)
        }
    }
}

/// Shorten long locators (inline payloads) for error messages and logs.
pub(crate) fn truncate_for_log(url: &str) -> String {
    const MAX: usize = 96;
    match url.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &url[..idx]),
        None => url.to_owned(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
