//! In-memory collaborators for testing and offline use.

use super::{
    AnnotatedImageUploader, BitmapFetcher, BoxFuture, CacheMode, FetchError, FetchResult,
    PresignedUrlProvider, UploadAck, UploadRequest, Variant,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

/// Serves bytes from a URL map and records every request.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: RwLock<HashMap<String, FetchResult<Vec<u8>>>>,
    requests: Mutex<Vec<(String, CacheMode)>>,
}

impl MemoryFetcher {
    /// Create a fetcher with no URLs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `url`.
    pub fn insert(&self, url: impl Into<String>, bytes: Vec<u8>) {
        if let Ok(mut responses) = self.responses.write() {
            responses.insert(url.into(), Ok(bytes));
        }
    }

    /// Fail every request for `url` with `error`.
    pub fn fail(&self, url: impl Into<String>, error: FetchError) {
        if let Ok(mut responses) = self.responses.write() {
            responses.insert(url.into(), Err(error));
        }
    }

    /// Requests made so far, in order.
    pub fn requests(&self) -> Vec<(String, CacheMode)> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl BitmapFetcher for MemoryFetcher {
    fn fetch(&self, url: &str, cache: CacheMode) -> BoxFuture<'_, FetchResult<Vec<u8>>> {
        let url = url.to_string();
        Box::pin(async move {
            self.requests
                .lock()
                .map_err(|e| FetchError::Other(format!("Lock error: {}", e)))?
                .push((url.clone(), cache));
            let responses = self
                .responses
                .read()
                .map_err(|e| FetchError::Other(format!("Lock error: {}", e)))?;
            responses
                .get(&url)
                .cloned()
                .unwrap_or(Err(FetchError::NotFound(url)))
        })
    }
}

/// Issues `{base}/{file_id}/{variant}` URLs.
#[derive(Debug)]
pub struct MemoryUrlProvider {
    base: String,
    failing: RwLock<HashSet<Variant>>,
}

impl MemoryUrlProvider {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            failing: RwLock::new(HashSet::new()),
        }
    }

    /// Refuse to issue URLs for `variant`.
    pub fn fail_variant(&self, variant: Variant) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(variant);
        }
    }
}

impl PresignedUrlProvider for MemoryUrlProvider {
    fn presigned_url(&self, file_id: &str, variant: Variant) -> BoxFuture<'_, FetchResult<String>> {
        let file_id = file_id.to_string();
        Box::pin(async move {
            let failing = self
                .failing
                .read()
                .map_err(|e| FetchError::Other(format!("Lock error: {}", e)))?;
            if failing.contains(&variant) {
                return Err(FetchError::NotFound(format!("{file_id} ({variant})")));
            }
            Ok(format!("{}/{}/{}", self.base, file_id, variant))
        })
    }
}

/// Records uploads; optionally fails them.
#[derive(Debug, Default)]
pub struct MemoryUploader {
    uploads: Mutex<Vec<UploadRequest>>,
    failure: RwLock<Option<FetchError>>,
}

impl MemoryUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail subsequent uploads with `error`, or succeed again with `None`.
    pub fn set_failure(&self, error: Option<FetchError>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = error;
        }
    }

    /// Uploads accepted so far.
    pub fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads
            .lock()
            .map(|uploads| uploads.clone())
            .unwrap_or_default()
    }
}

impl AnnotatedImageUploader for MemoryUploader {
    fn upload(&self, request: UploadRequest) -> BoxFuture<'_, FetchResult<UploadAck>> {
        Box::pin(async move {
            if let Some(error) = self
                .failure
                .read()
                .map_err(|e| FetchError::Other(format!("Lock error: {}", e)))?
                .clone()
            {
                return Err(error);
            }
            let mut uploads = self
                .uploads
                .lock()
                .map_err(|e| FetchError::Other(format!("Lock error: {}", e)))?;
            uploads.push(request);
            Ok(UploadAck {
                file_id: Some(format!("upload-{}", uploads.len())),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_unknown_url() {
        let fetcher = MemoryFetcher::new();
        let result = pollster::block_on(fetcher.fetch("https://x", CacheMode::Default));
        assert_eq!(result, Err(FetchError::NotFound("https://x".into())));
    }

    #[test]
    fn test_url_provider() {
        let urls = MemoryUrlProvider::new("mem://files");
        let url = pollster::block_on(urls.presigned_url("abc", Variant::Full)).unwrap();
        assert_eq!(url, "mem://files/abc/full");
    }

    #[test]
    fn test_uploader_records_and_fails() {
        let uploader = MemoryUploader::new();
        let request = UploadRequest {
            project_id: "p".into(),
            job_id: Some("j".into()),
            filename: "a.jpg".into(),
            mime_type: "image/jpeg".into(),
            base64_data: String::new(),
        };
        let ack = pollster::block_on(uploader.upload(request.clone())).unwrap();
        assert_eq!(ack.file_id.as_deref(), Some("upload-1"));

        uploader.set_failure(Some(FetchError::Status(500)));
        assert!(pollster::block_on(uploader.upload(request)).is_err());
        assert_eq!(uploader.uploads().len(), 1);
    }
}
