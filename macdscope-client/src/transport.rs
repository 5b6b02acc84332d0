//! Transport trait and the reqwest-backed HTTP implementation.
//!
//! The trait abstracts over how JSON reaches the backend so the gateway can be
//! driven by a scripted transport in tests.

use std::time::Duration;

use log::debug;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;

/// Transport-level failures: the backend was not reached or did not answer with JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("backend unreachable: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid backend URL '{0}'")]
    BadUrl(String),

    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// JSON request/response seam. Paths are given as unencoded segments.
pub trait Transport: Send + Sync {
    fn get_json(&self, path: &[&str], query: &[(&str, String)]) -> Result<Value, TransportError>;

    fn post_json(&self, path: &[&str], body: &Value) -> Result<Value, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn get_json(&self, path: &[&str], query: &[(&str, String)]) -> Result<Value, TransportError> {
        (**self).get_json(path, query)
    }

    fn post_json(&self, path: &[&str], body: &Value) -> Result<Value, TransportError> {
        (**self).post_json(path, body)
    }
}

/// Blocking reqwest transport rooted at the backend origin.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base = Url::parse(base_url).map_err(|_| TransportError::BadUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(TransportError::BadUrl(base_url.to_string()));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("macdscope/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL with `path` appended as percent-encoded segments.
    pub fn url(&self, path: &[&str], query: &[(&str, String)]) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| TransportError::BadUrl(self.base.to_string()))?;
            segments.pop_if_empty();
            segments.extend(path);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// A JSON body is returned whatever the status; the backend reports
    /// domain failures as HTTP 400 with an envelope.
    fn read(resp: reqwest::blocking::Response) -> Result<Value, TransportError> {
        let status = resp.status();
        let text = resp.text()?;
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(TransportError::Status {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            }),
            Err(e) => Err(TransportError::Decode(e.to_string())),
        }
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, path: &[&str], query: &[(&str, String)]) -> Result<Value, TransportError> {
        let url = self.url(path, query)?;
        debug!("GET {url}");
        let resp = self.client.get(url).send()?;
        Self::read(resp)
    }

    fn post_json(&self, path: &[&str], body: &Value) -> Result<Value, TransportError> {
        let url = self.url(path, &[])?;
        debug!("POST {url}");
        let resp = self.client.post(url).json(body).send()?;
        Self::read(resp)
    }
}
