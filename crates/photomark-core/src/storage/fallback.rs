//! Fallback chain for resolving a displayable bitmap.
//!
//! Cached URLs can go stale (expired signatures) while the file itself still
//! exists, so fresh URLs are requested only after the cached ones fail.

use super::{AcquireError, BitmapFetcher, CacheMode, FetchError, PresignedUrlProvider, Variant};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One source to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// A URL the host already holds.
    Cached { url: String, variant: Variant },
    /// A URL to request from the presigned-URL collaborator.
    Fresh(Variant),
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Cached { variant, .. } => write!(f, "cached {variant}"),
            Candidate::Fresh(variant) => write!(f, "fresh {variant}"),
        }
    }
}

/// A failed candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub candidate: Candidate,
    pub error: FetchError,
}

/// What the host knows about an image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub file_id: String,
    #[serde(default)]
    pub cached_preview_url: Option<String>,
    #[serde(default)]
    pub cached_full_url: Option<String>,
}

impl ImageSource {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            ..Self::default()
        }
    }

    pub fn with_cached_preview(mut self, url: impl Into<String>) -> Self {
        self.cached_preview_url = Some(url.into());
        self
    }

    pub fn with_cached_full(mut self, url: impl Into<String>) -> Self {
        self.cached_full_url = Some(url.into());
        self
    }

    /// Candidates in strict order: cached preview, cached full, fresh
    /// preview, fresh full. Missing cached URLs are skipped.
    pub fn candidates(&self) -> Vec<Candidate> {
        let cached = [
            (&self.cached_preview_url, Variant::Preview),
            (&self.cached_full_url, Variant::Full),
        ];
        cached
            .into_iter()
            .filter_map(|(url, variant)| {
                url.as_ref().map(|url| Candidate::Cached {
                    url: url.clone(),
                    variant,
                })
            })
            .chain([
                Candidate::Fresh(Variant::Preview),
                Candidate::Fresh(Variant::Full),
            ])
            .collect()
    }
}

/// Try each candidate in order and return the first non-empty body.
///
/// Every fetch bypasses caches. Each failure is logged and the next
/// candidate tried; when all fail the attempts are returned together.
pub async fn resolve_bitmap(
    fetcher: &dyn BitmapFetcher,
    urls: &dyn PresignedUrlProvider,
    file_id: &str,
    candidates: &[Candidate],
) -> Result<Vec<u8>, AcquireError> {
    if candidates.is_empty() {
        return Err(AcquireError::NoCandidates);
    }

    let mut attempts = Vec::new();
    for candidate in candidates {
        match try_candidate(fetcher, urls, file_id, candidate).await {
            Ok(bytes) => {
                log::info!("Loaded {} bytes for {file_id} from {candidate}", bytes.len());
                return Ok(bytes);
            }
            Err(error) => {
                log::warn!("Image source {candidate} for {file_id} failed: {error}");
                attempts.push(Attempt {
                    candidate: candidate.clone(),
                    error,
                });
            }
        }
    }

    log::error!("All image sources failed for {file_id}");
    Err(AcquireError::Exhausted { attempts })
}

/// Resolve the bitmap for `source` through its full candidate chain.
pub async fn acquire(
    fetcher: &dyn BitmapFetcher,
    urls: &dyn PresignedUrlProvider,
    source: &ImageSource,
) -> Result<Vec<u8>, AcquireError> {
    resolve_bitmap(fetcher, urls, &source.file_id, &source.candidates()).await
}

async fn try_candidate(
    fetcher: &dyn BitmapFetcher,
    urls: &dyn PresignedUrlProvider,
    file_id: &str,
    candidate: &Candidate,
) -> Result<Vec<u8>, FetchError> {
    let url = match candidate {
        Candidate::Cached { url, .. } => url.clone(),
        Candidate::Fresh(variant) => urls.presigned_url(file_id, *variant).await?,
    };
    let bytes = fetcher.fetch(&url, CacheMode::NoStore).await?;
    if bytes.is_empty() {
        return Err(FetchError::Empty(url));
    }
    Ok(bytes)
}
