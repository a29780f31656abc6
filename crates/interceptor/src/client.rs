//! HTTP transport driven through the interceptor pipeline
//!
//! `SessionClient` resolves request paths against the API base URL, runs the
//! request interceptors, dispatches with reqwest, and converts non-2xx
//! responses and transport errors into `RequestFailure`. Response
//! interceptors finish before the failure is handed back, so by the time a
//! caller sees a 401 the credential is already cleared.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::failure::{RequestFailure, Result};
use crate::metrics::record_request;
use crate::pipeline::Pipeline;
use crate::request::PendingRequest;

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| RequestFailure::Decode(e.to_string()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Clone)]
pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    pipeline: Pipeline,
}

impl SessionClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        timeout: Duration,
        pipeline: Pipeline,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            timeout,
            pipeline,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Absolute URLs pass through; paths are appended to the base URL.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }

    pub async fn get(&self, url: &str) -> Result<ApiResponse> {
        self.send(PendingRequest::get(url)).await
    }

    pub async fn post_json(&self, url: &str, body: serde_json::Value) -> Result<ApiResponse> {
        self.send(PendingRequest::post(url).with_json(body)).await
    }

    /// Run a request through the pipeline and dispatch it.
    #[instrument(
        skip_all,
        fields(request_id = %request.request_id, method = %request.method, url = %request.url)
    )]
    pub async fn send(&self, mut request: PendingRequest) -> Result<ApiResponse> {
        self.pipeline.prepare(&mut request).await;

        let target = self.resolve_url(&request.url);
        let mut builder = self
            .http
            .request(request.method.clone(), &target)
            .headers(request.headers.clone())
            .timeout(self.timeout);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let outcome = match builder.send().await {
            Ok(response) => {
                let status = response.status();
                let headers = response.headers().clone();
                match response.bytes().await {
                    Ok(body) if status.is_success() => Ok(ApiResponse {
                        status: status.as_u16(),
                        headers,
                        body,
                    }),
                    Ok(body) => Err(RequestFailure::from_status(
                        status.as_u16(),
                        request.url.clone(),
                        String::from_utf8_lossy(&body).into_owned(),
                    )),
                    Err(e) => Err(RequestFailure::Transport {
                        url: request.url.clone(),
                        message: format!("reading response body: {e}"),
                    }),
                }
            }
            Err(e) => Err(RequestFailure::Transport {
                url: request.url.clone(),
                message: e.to_string(),
            }),
        };

        match outcome {
            Ok(response) => {
                record_request(Some(response.status));
                debug!(status = response.status, bytes = response.body.len(), "request succeeded");
                Ok(response)
            }
            Err(failure) => {
                record_request(failure.status());
                warn!(error = %failure, "request failed");
                self.pipeline.observe(&request, &failure).await;
                Err(failure)
            }
        }
    }
}
