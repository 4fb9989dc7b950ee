//! HTTP implementations of the storage collaborators.

use photomark_core::storage::{
    AnnotatedImageUploader, BitmapFetcher, BoxFuture, CacheMode, FetchError, FetchResult,
    PresignedUrlProvider, UploadAck, UploadRequest, Variant,
};
use reqwest::header::{CACHE_CONTROL, HeaderValue, PRAGMA};
use serde::Deserialize;

/// Talks to the project API and fetches signed URLs.
///
/// The bearer token is only sent to the API itself, never to signed
/// storage URLs.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PresignedUrlResponse {
    url: String,
}

impl HttpClient {
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("photomark/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn fetch_error(err: reqwest::Error) -> FetchError {
    match err.status() {
        Some(status) => FetchError::Status(status.as_u16()),
        None => FetchError::Network(err.to_string()),
    }
}

async fn checked(response: reqwest::Response) -> FetchResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status(status.as_u16()))
    }
}

impl BitmapFetcher for HttpClient {
    fn fetch(&self, url: &str, cache: CacheMode) -> BoxFuture<'_, FetchResult<Vec<u8>>> {
        let mut request = self.client.get(url);
        if cache == CacheMode::NoStore {
            request = request
                .header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
                .header(PRAGMA, HeaderValue::from_static("no-cache"));
        }
        Box::pin(async move {
            let response = checked(request.send().await.map_err(fetch_error)?).await?;
            let bytes = response.bytes().await.map_err(fetch_error)?;
            Ok(bytes.to_vec())
        })
    }
}

impl PresignedUrlProvider for HttpClient {
    fn presigned_url(&self, file_id: &str, variant: Variant) -> BoxFuture<'_, FetchResult<String>> {
        let request = self.authorized(
            self.client
                .get(self.endpoint(&format!("/files/{file_id}/url")))
                .query(&[("variant", variant.to_string())]),
        );
        Box::pin(async move {
            let response = checked(request.send().await.map_err(fetch_error)?).await?;
            let body: PresignedUrlResponse = response.json().await.map_err(fetch_error)?;
            Ok(body.url)
        })
    }
}

impl AnnotatedImageUploader for HttpClient {
    fn upload(&self, request: UploadRequest) -> BoxFuture<'_, FetchResult<UploadAck>> {
        let builder = self.authorized(
            self.client
                .post(self.endpoint(&format!(
                    "/projects/{}/annotated-images",
                    request.project_id
                )))
                .json(&request),
        );
        Box::pin(async move {
            let response = checked(builder.send().await.map_err(fetch_error)?).await?;
            // Some deployments answer with an empty body.
            let text = response.text().await.map_err(fetch_error)?;
            if text.trim().is_empty() {
                return Ok(UploadAck::default());
            }
            serde_json::from_str(&text).map_err(|e| FetchError::Other(e.to_string()))
        })
    }
}
