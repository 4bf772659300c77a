// HTTP service adapter - JSON over HTTP client for the processing service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Default address of the processing service
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Processing service reached over HTTP
pub struct HttpClipService {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    message: String,
}

impl HttpClipService {
    /// Create new HTTP adapter; `timeout` bounds every request
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("clipscene/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and turn non-2xx responses into transport errors
    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<Response, DomainError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request to processing service failed");
            DomainError::network(format!("{}: {}", fallback, e))
        })?;

        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "Service response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_detail(&body).unwrap_or_else(|| fallback.to_string());
        warn!(status = status.as_u16(), detail = %message, "Service rejected request");
        Err(DomainError::http(status.as_u16(), message))
    }

    async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, DomainError> {
        response
            .json::<T>()
            .await
            .map_err(|e| DomainError::network(format!("{}: unexpected response: {}", fallback, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> Result<T, DomainError> {
        let response = self.send(self.client.get(self.url(path)), fallback).await?;
        Self::decode(response, fallback).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B, fallback: &str) -> Result<T, DomainError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)).json(body);
        let response = self.send(request, fallback).await?;
        Self::decode(response, fallback).await
    }
}

/// String `detail` field of an error body, if there is one
///
/// Validation errors of the service carry a list under `detail`; those fall
/// back to the generic message.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")?
        .as_str()
        .map(str::trim)
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl ClipServicePort for HttpClipService {
    async fn health(&self) -> Result<String, DomainError> {
        let response: HealthResponse = self.get_json("/", "Service is not reachable").await?;
        Ok(response.message)
    }

    async fn discover_formats(&self, youtube_url: &str) -> Result<Vec<FormatDescriptor>, DomainError> {
        let request = FormatsRequest {
            youtube_url: youtube_url.to_string(),
        };
        let response: FormatsResponse = self
            .post_json("/video-formats", &request, "Failed to get video formats")
            .await?;
        Ok(response.formats)
    }

    async fn download_video(&self, request: &DownloadRequest) -> Result<VideoAccepted, DomainError> {
        self.post_json("/download-video", request, "Failed to start video download")
            .await
    }

    async fn video_status(&self, video_id: &str) -> Result<VideoStatusResponse, DomainError> {
        self.get_json(&format!("/video/{}", video_id), "Failed to get video status")
            .await
    }

    async fn list_videos(&self) -> Result<Vec<VideoSummary>, DomainError> {
        let response: VideoListResponse = self.get_json("/videos", "Failed to list videos").await?;
        Ok(response.videos)
    }

    async fn latest_video(&self) -> Result<LatestVideo, DomainError> {
        self.get_json("/latest-video", "Failed to get latest video")
            .await
    }

    async fn preview_clips(&self, request: &CreateClipsRequest) -> Result<PreviewResponse, DomainError> {
        self.post_json("/preview-clips", request, "Failed to preview clips")
            .await
    }

    async fn create_clips_from_video(
        &self,
        request: &CreateClipsRequest,
    ) -> Result<JobAccepted, DomainError> {
        self.post_json("/create-clips-from-video", request, "Failed to create clips")
            .await
    }

    async fn submit_clip_job(&self, request: &ClipJobRequest) -> Result<JobAccepted, DomainError> {
        self.post_json("/download-and-create-clips", request, "Failed to create clips")
            .await
    }

    async fn submit_legacy_clip_job(&self, request: &ClipJobRequest) -> Result<JobAccepted, DomainError> {
        self.post_json("/create-clips", request, "Failed to create clips")
            .await
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, DomainError> {
        self.get_json(&format!("/job/{}", job_id), "Failed to get job status")
            .await
    }

    async fn download_archive(&self, job_id: &str) -> Result<Vec<u8>, DomainError> {
        let fallback = "Failed to download clips";
        let response = self
            .send(self.client.get(self.url(&format!("/download/{}", job_id))), fallback)
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::network(format!("{}: {}", fallback, e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_string_detail() {
        assert_eq!(
            extract_detail(r#"{"detail": "Job not found"}"#),
            Some("Job not found".to_string())
        );
    }

    #[test]
    fn test_extract_detail_ignores_other_shapes() {
        assert_eq!(extract_detail(r#"{"detail": [{"loc": ["body"], "msg": "x"}]}"#), None);
        assert_eq!(extract_detail(r#"{"detail": "  "}"#), None);
        assert_eq!(extract_detail(r#"{"message": "nope"}"#), None);
        assert_eq!(extract_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(extract_detail(""), None);
    }

    #[test]
    fn test_base_url_is_normalized() {
        let service = HttpClipService::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(service.base_url(), DEFAULT_BASE_URL);
        assert_eq!(service.url("/job/abc"), "http://localhost:8000/job/abc");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // Port 9 (discard) is not served on test machines
        let service = HttpClipService::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let error = service.job_status("abc").await.unwrap_err();
        assert!(error.is_transport());
        assert!(error.to_string().starts_with("Failed to get job status"));
    }
}
