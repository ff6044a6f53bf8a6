// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::config::RemoteConfig;
use crate::errors::{ConfigError, DispatchError, DispatchResult};
use crate::job::{RemoteJobHandle, ValidatedRequest};
use crate::observability::messages::{remote::*, StructuredLog};
use crate::traits::RemoteWorker;

/// Multipart field carrying the source media.
const SOURCE_FIELD: &str = "video";

/// Body returned by every tool endpoint.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    filename: Option<String>,
    job_id: Option<serde_json::Value>,
    download_id: Option<serde_json::Value>,
    error: Option<String>,
}

impl SubmitResponse {
    /// Handle for an accepted submission.
    ///
    /// A worker-assigned `job_id` (or the older `download_id`) starts a
    /// polling job. A bare `filename` means the worker finished inline and
    /// the handle is already completed with that file as its result.
    fn into_handle(self) -> Option<RemoteJobHandle> {
        let worker_id = self
            .job_id
            .as_ref()
            .or(self.download_id.as_ref())
            .and_then(id_to_string);
        let filename = self.filename.filter(|name| !name.is_empty());

        match (worker_id, filename) {
            (Some(id), _) => Some(RemoteJobHandle::accepted(id)),
            (None, Some(filename)) => {
                Some(RemoteJobHandle::accepted(filename.clone()).completed(filename))
            }
            (None, None) => None,
        }
    }
}

fn id_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Body returned by `GET /status/{id}`.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    file: Option<String>,
    message: Option<String>,
}

/// HTTP client for the remote processing worker.
///
/// Each tool posts a multipart form to its own endpoint; job status is read
/// from `/status/{id}` and artifacts are downloaded from
/// `/download-file/{name}`.
pub struct HttpRemoteWorker {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpRemoteWorker {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::RemoteClient(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::RemoteClient(format!(
                "base URL '{}' cannot have endpoint paths appended",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ConfigError::RemoteClient(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, ConfigError> {
        Self::new(&config.base_url, config.request_timeout())
    }

    /// Join path segments onto the base URL, keeping any base path prefix.
    fn endpoint(&self, segments: &[&str]) -> DispatchResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DispatchError::RemoteUnavailable(format!("invalid base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments.iter().map(|segment| segment.trim_matches('/')));
        Ok(url)
    }

    fn unavailable(context: &str, error: impl std::fmt::Display) -> DispatchError {
        DispatchError::RemoteUnavailable(format!("{}: {}", context, error))
    }
}

#[async_trait]
impl RemoteWorker for HttpRemoteWorker {
    async fn submit(&self, request: &ValidatedRequest) -> DispatchResult<RemoteJobHandle> {
        let url = self.endpoint(&[request.tool().endpoint()])?;
        SubmissionStarted {
            worker: self.name(),
            endpoint: url.as_str(),
            size_bytes: request.request.size(),
        }
        .log();

        let source = Part::stream_with_length(
            reqwest::Body::from(request.request.source.clone()),
            request.request.size(),
        )
        .file_name(request.upload_name());
        let form = request
            .params
            .form_fields()
            .into_iter()
            .fold(Form::new().part(SOURCE_FIELD, source), |form, (name, value)| {
                form.text(name, value)
            });

        let result = async {
            let response = self
                .client
                .post(url.clone())
                .multipart(form)
                .send()
                .await
                .map_err(|e| Self::unavailable("submission failed", e))?;

            // Rejections still carry a JSON body with the reason.
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| Self::unavailable("failed to read submission response", e))?;
            let parsed: SubmitResponse = serde_json::from_slice(&body).map_err(|e| {
                if status.is_success() {
                    Self::unavailable("undecodable submission response", e)
                } else {
                    DispatchError::RemoteUnavailable(format!("HTTP {}", status))
                }
            })?;

            if !status.is_success() || !parsed.success {
                let reason = parsed
                    .error
                    .unwrap_or_else(|| format!("HTTP {}", status));
                return Err(DispatchError::RemoteUnavailable(reason));
            }

            parsed.into_handle().ok_or_else(|| {
                    DispatchError::RemoteUnavailable(
                        "submission response carried no job id or filename".to_string(),
                    )
                })
        }
        .await;

        match &result {
            Ok(handle) => SubmissionAccepted {
                worker: self.name(),
                remote_id: &handle.id,
            }
            .log(),
            Err(e) => SubmissionRejected {
                worker: self.name(),
                reason: &e.to_string(),
            }
            .log(),
        }
        result
    }

    async fn poll(&self, handle: &RemoteJobHandle) -> DispatchResult<RemoteJobHandle> {
        let url = self.endpoint(&["status", &handle.id])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::unavailable("status poll failed", e))?
            .error_for_status()
            .map_err(|e| Self::unavailable("status poll rejected", e))?;

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable("undecodable status response", e))?;

        let next = match body.status.as_str() {
            "processing" => handle.clone(),
            "completed" => match body.file {
                Some(file) if !file.is_empty() => handle.completed(file),
                _ => handle.failed("Worker reported completion without a result file"),
            },
            "error" => handle.failed(
                body.message
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ),
            other => handle.failed(format!("Unknown status: {}", other)),
        };
        Ok(next)
    }

    async fn fetch_result(&self, result_ref: &str) -> DispatchResult<Bytes> {
        let url = self.endpoint(&["download-file", result_ref])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::unavailable("download failed", e))?
            .error_for_status()
            .map_err(|e| Self::unavailable("download rejected", e))?;

        response
            .bytes()
            .await
            .map_err(|e| Self::unavailable("failed to read download", e))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobRequest, RemoteStatus, ToolType};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn worker(server: &MockServer) -> HttpRemoteWorker {
        HttpRemoteWorker::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn gif_request() -> ValidatedRequest {
        JobRequest::new(ToolType::Gif, b"fake-video-bytes".to_vec())
            .with_source_name("clip.mp4")
            .with_option("start", "2")
            .validate()
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_posts_multipart_to_tool_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/video-to-gif"))
            .and(body_string_contains("name=\"video\"; filename=\"clip.mp4\""))
            .and(body_string_contains("fake-video-bytes"))
            .and(body_string_contains("name=\"fps\""))
            .and(header_exists("content-length"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "filename": "clip.gif", "job_id": "abc"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let handle = worker(&server).submit(&gif_request()).await.unwrap();
        assert_eq!(handle.id, "abc");
        assert_eq!(handle.status, RemoteStatus::Processing);
    }

    #[tokio::test]
    async fn test_submit_prefers_worker_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "filename": "clip.gif", "download_id": 77})),
            )
            .mount(&server)
            .await;

        let handle = worker(&server).submit(&gif_request()).await.unwrap();
        assert_eq!(handle.id, "77");
        assert_eq!(handle.status, RemoteStatus::Processing);
        assert_eq!(handle.result_ref, None);
    }

    #[tokio::test]
    async fn test_submit_with_only_filename_is_already_completed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/video-to-gif"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "filename": "clip.gif"})),
            )
            .mount(&server)
            .await;

        let handle = worker(&server).submit(&gif_request()).await.unwrap();
        assert_eq!(handle.status, RemoteStatus::Completed);
        assert_eq!(handle.result_ref.as_deref(), Some("clip.gif"));
        assert!(handle.is_terminal());
    }

    #[tokio::test]
    async fn test_submit_without_id_or_filename() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let error = worker(&server).submit(&gif_request()).await.unwrap_err();
        assert!(matches!(error, DispatchError::RemoteUnavailable(_)));
    }

    #[tokio::test]
    async fn test_submit_rejection_maps_to_remote_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/video-to-gif"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({"success": false, "error": "busy"})),
            )
            .mount(&server)
            .await;

        let error = worker(&server).submit(&gif_request()).await.unwrap_err();
        assert!(matches!(error, DispatchError::RemoteUnavailable(reason) if reason == "busy"));
    }

    #[tokio::test]
    async fn test_submit_success_false_with_ok_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "error": "No video file"})),
            )
            .mount(&server)
            .await;

        let error = worker(&server).submit(&gif_request()).await.unwrap_err();
        assert!(matches!(error, DispatchError::RemoteUnavailable(reason) if reason == "No video file"));
    }

    #[tokio::test]
    async fn test_submit_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let error = worker(&server).submit(&gif_request()).await.unwrap_err();
        assert!(matches!(error, DispatchError::RemoteUnavailable(reason) if reason.contains("502")));
    }

    #[tokio::test]
    async fn test_submit_connection_refused() {
        let worker = HttpRemoteWorker::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let error = worker.submit(&gif_request()).await.unwrap_err();
        assert!(matches!(error, DispatchError::RemoteUnavailable(_)));
    }

    #[tokio::test]
    async fn test_poll_maps_each_status() {
        let server = MockServer::start().await;
        let cases = [
            ("p", json!({"status": "processing", "progress": 0}), RemoteStatus::Processing, None, None),
            ("c", json!({"status": "completed", "file": "out.mp4"}), RemoteStatus::Completed, Some("out.mp4"), None),
            ("e", json!({"status": "error", "message": "codec"}), RemoteStatus::Error, None, Some("codec")),
            ("n", json!({"status": "not_found"}), RemoteStatus::Error, None, Some("Unknown status: not_found")),
        ];
        for (id, body, ..) in &cases {
            Mock::given(method("GET"))
                .and(path(format!("/status/{}", id)))
                .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
                .mount(&server)
                .await;
        }

        let worker = worker(&server);
        for (id, _, status, result_ref, message) in cases {
            let polled = worker.poll(&RemoteJobHandle::accepted(id)).await.unwrap();
            assert_eq!(polled.status, status, "status for {id}");
            assert_eq!(polled.result_ref.as_deref(), result_ref);
            assert_eq!(polled.message.as_deref(), message);
        }
    }

    #[tokio::test]
    async fn test_poll_server_error_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let error = worker(&server)
            .poll(&RemoteJobHandle::accepted("x"))
            .await
            .unwrap_err();
        assert!(matches!(error, DispatchError::RemoteUnavailable(_)));
    }

    #[tokio::test]
    async fn test_base_path_prefix_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/download-file/out.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"artifact".to_vec()))
            .mount(&server)
            .await;

        let worker =
            HttpRemoteWorker::new(&format!("{}/api/v1/", server.uri()), Duration::from_secs(5)).unwrap();
        let bytes = worker.fetch_result("out.mp4").await.unwrap();
        assert_eq!(&bytes[..], b"artifact");
    }

    #[tokio::test]
    async fn test_fetch_missing_artifact() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "File not found"})))
            .mount(&server)
            .await;

        let error = worker(&server).fetch_result("gone.mp4").await.unwrap_err();
        assert!(matches!(error, DispatchError::RemoteUnavailable(_)));
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result = HttpRemoteWorker::new("mailto:ops@example.com", Duration::from_secs(1));
        assert!(matches!(result, Err(ConfigError::RemoteClient(_))));
    }
}
