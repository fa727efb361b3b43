//! Client for the remote analysis service.
//!
//! [`ReviewService`] is the seam the front end and the tests program against;
//! [`HttpReviewService`] is the `reqwest` implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::types::{AnalysisRequest, AnalysisResult, ChatRequest, FeedbackRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[async_trait]
pub trait ReviewService: Send + Sync {
    /// `POST /analyze`.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult>;
    /// `POST /chat`; returns the assistant's reply text.
    async fn chat(&self, request: &ChatRequest) -> Result<String>;
    /// `POST /feedback`.
    async fn feedback(&self, request: &FeedbackRequest) -> Result<()>;
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// HTTP/JSON implementation of [`ReviewService`].
#[derive(Debug, Clone)]
pub struct HttpReviewService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpReviewService {
    /// Builds a client for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the underlying client cannot be
    /// constructed (TLS backend initialisation).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends `body` to `path` and returns the raw response body on 2xx.
    async fn post(&self, path: &str, body: &impl Serialize) -> Result<Vec<u8>> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let response = self.http.post(&url).json(body).send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::Transport)?;

        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        match serde_json::from_slice::<ErrorBody>(&bytes) {
            Ok(ErrorBody { detail }) => {
                Err(ApiError::Service { status: status.as_u16(), detail })
            }
            Err(_) => Err(ApiError::UnexpectedStatus { status: status.as_u16() }),
        }
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T> {
        let body = self.post(path, body).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ReviewService for HttpReviewService {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        self.post_json("analyze", request).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let reply: ChatResponse = self.post_json("chat", request).await?;
        Ok(reply.response)
    }

    async fn feedback(&self, request: &FeedbackRequest) -> Result<()> {
        self.post("feedback", request).await.map(|_| ())
    }
}
