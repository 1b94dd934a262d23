//! HTTP transport and the authenticated JSON service client.
//!
//! `Transport` is the seam between request construction and the network:
//! `HttpTransport` sends over reqwest, tests substitute an in-memory one.
//! `ServiceClient` signs each request, sends it, and decodes the JSON reply
//! into a typed response or a typed service error. No retries are made.

use crate::auth::{self, RequestAuthenticator, EMPTY_BODY};
use crate::error::{RpcError, ServiceError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

pub const HEADER_IDENTITY: &str = "x-identity";
pub const HEADER_SIGNATURE: &str = "x-signature";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Lowercase name, as used in the string to sign.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
        }
    }
}

/// A fully prepared request: absolute URL, headers, body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends prepared requests.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, RpcError>> + Send;
}

// =============================================================================
// reqwest transport
// =============================================================================

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Idle connections kept per host.
    pub pool_max_idle_per_host: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 4,
        }
    }
}

/// `Transport` over reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    config: RpcConfig,
}

impl HttpTransport {
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|e| RpcError::Connection(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    fn build_headers(headers: &[(String, String)]) -> Result<HeaderMap, RpcError> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RpcError::Connection(format!("header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RpcError::Connection(format!("header value: {}", e)))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RpcError> {
        let method = request.method.as_str();
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        let builder = builder.headers(Self::build_headers(&request.headers)?);
        let builder = match request.body {
            Some(body) => builder.body(body),
            None => builder,
        };

        let resp = builder.send().await.map_err(|e| RpcError::Http {
            method: method.to_string(),
            url: request.url.clone(),
            source: e,
        })?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| RpcError::Http {
            method: method.to_string(),
            url: request.url.clone(),
            source: e,
        })?;

        Ok(HttpResponse { status, body })
    }
}

// =============================================================================
// Service client
// =============================================================================

/// Authenticated JSON client for one wallet service.
pub struct ServiceClient<T: Transport> {
    transport: T,
    base_url: String,
}

impl<T: Transport> ServiceClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Point subsequent requests at another service.
    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.trim_end_matches('/').to_string();
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Signed GET of `path` (which may already carry a query string).
    pub async fn get<R: DeserializeOwned>(
        &self,
        auth: &RequestAuthenticator,
        path: &str,
    ) -> Result<R, RpcError> {
        let uri = auth::add_url_reference(path);
        let signature = auth.signature(HttpMethod::Get.as_str(), &uri, EMPTY_BODY);
        log::debug!("GET {}", path);
        log::trace!("x-identity {} x-signature {}", auth.copayer_id(), signature);

        let request = HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{}", self.base_url, uri),
            headers: vec![
                (HEADER_IDENTITY.into(), auth.copayer_id().into()),
                (HEADER_SIGNATURE.into(), signature),
                ("accept".into(), "application/json".into()),
            ],
            body: None,
        };
        self.execute(request, path).await
    }

    /// Signed POST of a JSON body. The compact `serde_json` rendering is both
    /// the transmitted body and the signed string; it never escapes `/`.
    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        auth: &RequestAuthenticator,
        path: &str,
        body: &B,
    ) -> Result<R, RpcError> {
        let body = serde_json::to_string(body)?;
        self.post_raw(auth, path, body).await
    }

    /// Signed POST without arguments (sends and signs `{}`).
    pub async fn post_empty<R: DeserializeOwned>(
        &self,
        auth: &RequestAuthenticator,
        path: &str,
    ) -> Result<R, RpcError> {
        self.post_raw(auth, path, EMPTY_BODY.to_string()).await
    }

    async fn post_raw<R: DeserializeOwned>(
        &self,
        auth: &RequestAuthenticator,
        path: &str,
        body: String,
    ) -> Result<R, RpcError> {
        let signature = auth.signature(HttpMethod::Post.as_str(), path, &body);
        log::debug!("POST {} ({} bytes)", path, body.len());
        log::trace!("x-identity {} x-signature {}", auth.copayer_id(), signature);

        let request = HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}{}", self.base_url, path),
            headers: vec![
                (HEADER_IDENTITY.into(), auth.copayer_id().into()),
                (HEADER_SIGNATURE.into(), signature),
                ("Content-Type".into(), "application/json".into()),
            ],
            body: Some(body),
        };
        self.execute(request, path).await
    }

    async fn execute<R: DeserializeOwned>(
        &self,
        request: HttpRequest,
        path: &str,
    ) -> Result<R, RpcError> {
        let method = request.method.as_str();
        let url = request.url.clone();
        let resp = self.transport.send(request).await?;

        if !resp.is_success() {
            log::warn!("{} {} returned HTTP {}", method, path, resp.status);
            return Err(match ServiceError::from_body(&resp.body) {
                Some(error) => RpcError::Service {
                    status: resp.status,
                    error,
                },
                None => RpcError::HttpStatus {
                    method: method.to_string(),
                    url,
                    status: resp.status,
                    body: resp.body.chars().take(500).collect(),
                },
            });
        }

        serde_json::from_str(&resp.body).map_err(|e| {
            match ServiceError::from_body(&resp.body) {
                Some(error) if !error.code.is_empty() => RpcError::Service {
                    status: resp.status,
                    error,
                },
                _ => RpcError::Protocol {
                    path: path.to_string(),
                    message: e.to_string(),
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = RpcConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_base_url_trimmed() {
        let transport = HttpTransport::new(RpcConfig::default()).unwrap();
        let mut client = ServiceClient::new("https://example.com/vws/api/", transport);
        assert_eq!(client.base_url(), "https://example.com/vws/api");
        client.set_base_url("http://localhost:3232/bws/api");
        assert_eq!(client.base_url(), "http://localhost:3232/bws/api");
    }

    #[test]
    fn test_request_header_lookup() {
        let req = HttpRequest {
            method: HttpMethod::Post,
            url: "http://x/".into(),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: None,
        };
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("x-identity"), None);
        assert_eq!(HttpMethod::Get.as_str(), "get");
    }
}
