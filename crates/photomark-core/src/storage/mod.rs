//! Storage collaborators: bitmap fetching, presigned URLs and uploads.
//!
//! The engine only needs image bytes in and a flattened JPEG out. These
//! traits describe the services that provide them; implementations live in
//! the host (HTTP in the app crate, in-memory here for tests).

mod fallback;
mod memory;

pub use fallback::{Attempt, Candidate, ImageSource, acquire, resolve_bitmap};
pub use memory::{MemoryFetcher, MemoryUploader, MemoryUrlProvider};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Collaborator errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Empty response from {0}")]
    Empty(String),
    #[error("{0}")]
    Other(String),
}

/// Result type for collaborator calls.
pub type FetchResult<T> = Result<T, FetchError>;

/// Every candidate in the fallback chain failed.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("No image source candidates")]
    NoCandidates,
    #[error("All {} image sources failed", .attempts.len())]
    Exhausted { attempts: Vec<Attempt> },
}

/// Boxed future for collaborator calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Stored rendition of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Downscaled rendition for display.
    Preview,
    /// Original upload.
    Full,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variant::Preview => "preview",
            Variant::Full => "full",
        })
    }
}

/// HTTP cache behaviour for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    #[default]
    Default,
    /// Bypass every cache; cached signed URLs may have expired.
    NoStore,
}

/// Fetches raw image bytes by URL.
pub trait BitmapFetcher: Send + Sync {
    fn fetch(&self, url: &str, cache: CacheMode) -> BoxFuture<'_, FetchResult<Vec<u8>>>;
}

/// Issues fresh signed URLs for a stored file.
pub trait PresignedUrlProvider: Send + Sync {
    fn presigned_url(&self, file_id: &str, variant: Variant) -> BoxFuture<'_, FetchResult<String>>;
}

/// Payload handed to the upload collaborator on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub project_id: String,
    pub job_id: Option<String>,
    pub filename: String,
    pub mime_type: String,
    /// Base64 (standard alphabet) of the flattened image.
    pub base64_data: String,
}

/// Acknowledgement from the upload collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAck {
    #[serde(default)]
    pub file_id: Option<String>,
}

/// Stores a flattened, annotated image.
pub trait AnnotatedImageUploader: Send + Sync {
    fn upload(&self, request: UploadRequest) -> BoxFuture<'_, FetchResult<UploadAck>>;
}
