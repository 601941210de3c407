use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::progress::Progress;

pub const TUNNEL_BYPASS_HEADER: &str = "ngrok-skip-browser-warning";

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Clone)]
pub struct Transport {
    client: reqwest::Client,
    config: ClientConfig,
    progress: Option<Arc<Progress>>,
}

impl Transport {
    pub fn new(config: &ClientConfig, progress: Option<Arc<Progress>>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if config.tunnel_bypass {
            headers.insert(
                HeaderName::from_static(TUNNEL_BYPASS_HEADER),
                HeaderValue::from_static("true"),
            );
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            config: config.clone(),
            progress,
        })
    }

    pub async fn send_empty(&self, method: Method, path: &str) -> Result<RawResponse, ApiError> {
        self.send::<()>(method, path, None).await
    }

    /// Issues one request. Non-2xx statuses come back as a normal response;
    /// only connection-level failures are errors.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<RawResponse, ApiError> {
        let url = self.config.endpoint(path)?;
        if let Some(p) = &self.progress {
            p.http_start(&method, &url);
        }

        let mut req = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            req = req.json(body);
        }

        let network = |source| ApiError::Network {
            method: method.clone(),
            url: url.to_string(),
            source,
        };

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                if let Some(p) = &self.progress {
                    p.http_err(&method, &url);
                }
                tracing::warn!(%method, %url, error = %e, "request failed");
                return Err(network(e));
            }
        };

        let status = resp.status();
        let body = match resp.bytes().await {
            Ok(b) => b,
            Err(e) => {
                if let Some(p) = &self.progress {
                    p.http_err(&method, &url);
                }
                return Err(network(e));
            }
        };

        if let Some(p) = &self.progress {
            p.http_done(&method, &url, status, body.len());
        }
        tracing::debug!(%method, %url, %status, bytes = body.len(), "response");

        Ok(RawResponse { status, body })
    }
}
