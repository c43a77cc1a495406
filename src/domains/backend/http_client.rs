//! HTTP implementation of the backend invoker.

use async_trait::async_trait;
use reqwest::{
    Client, Method, Url,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument};

use super::{BackendCall, BackendError, BackendInvoker, HttpMethod};
use crate::core::config::BackendConfig;
use crate::core::{Error, Result};

/// Header carrying the backend API key.
const BACKEND_KEY_HEADER: &str = "x-api-key";

/// Backend invoker talking JSON over HTTP to the backlog API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Build the HTTP client from configuration.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let raw_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| Error::config("backend base URL is not configured"))?;
        let base_url = Url::parse(raw_url)
            .map_err(|e| Error::config(format!("invalid backend base URL '{}': {}", raw_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "backend base URL '{}' cannot carry a path",
                raw_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| Error::config("backend API key is not a valid header value"))?;
            headers.insert(BACKEND_KEY_HEADER, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Join the call's path segments onto the base URL, percent-encoding each one.
pub fn build_url(base: &Url, call: &BackendCall) -> std::result::Result<Url, BackendError> {
    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| BackendError::InvalidUrl {
            operation: call.operation.clone(),
            message: format!("'{}' cannot be a base URL", base),
        })?;
        segments.pop_if_empty().extend(call.segments.iter());
    }
    Ok(url)
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
    }
}

/// Decode a successful response body.
///
/// Bodies declared as JSON must parse; anything else is parsed as JSON when
/// possible and otherwise returned as a plain string.
pub fn decode_body(
    operation: &str,
    declared_json: bool,
    text: String,
) -> std::result::Result<Value, BackendError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(e) if declared_json => Err(BackendError::malformed(operation, e.to_string())),
        Err(_) => Ok(Value::String(text)),
    }
}

#[async_trait]
impl BackendInvoker for HttpBackend {
    #[instrument(skip(self, call), fields(operation = %call.operation, method = %call.method))]
    async fn invoke(&self, call: BackendCall) -> std::result::Result<Value, BackendError> {
        let url = build_url(&self.base_url, &call)?;
        debug!("Calling backend: {} {}", call.method, url.path());

        let started = Instant::now();
        let mut request = self.client.request(to_reqwest_method(call.method), url);
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("Backend request failed: {}", e);
            BackendError::transport(&call.operation, e.to_string())
        })?;

        let status = response.status();
        let declared_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("json"));
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::transport(&call.operation, e.to_string()))?;

        debug!(
            "Backend answered {} in {}ms",
            status.as_u16(),
            started.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(BackendError::status(&call.operation, status.as_u16(), text));
        }

        decode_body(&call.operation, declared_json, text)
    }
}
