//! Request/response descriptors and the pluggable HTTP transport.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{RequestContext, TransportError};
use crate::{Error, Result};

use super::config::ClientConfig;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An HTTP request ready to be sent to the API.
///
/// Requests that should carry the client's access token are marked with
/// [`authenticated`](Request::authenticated); the client replaces the marker
/// with a real `Authorization` header just before sending.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Full request URL
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Bytes>,
}

impl Request {
    /// Create a request with no headers or body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Create a GET request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a POST request.
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Create a PATCH request.
    pub fn patch(url: Url) -> Self {
        Self::new(Method::PATCH, url)
    }

    /// Mark the request as requiring authentication.
    ///
    /// An existing `Authorization` header is kept; otherwise an empty one is
    /// inserted as a marker for the client to fill in.
    pub fn authenticated(mut self) -> Self {
        if !self.headers.contains_key(AUTHORIZATION) {
            self.headers
                .insert(AUTHORIZATION, HeaderValue::from_static(""));
        }
        self
    }

    /// Authenticate the request with an explicit bearer token (without the
    /// `Bearer ` prefix).
    pub fn bearer(mut self, access_token: &str) -> Result<Self> {
        self.set_authorization(&format!("Bearer {}", access_token))?;
        Ok(self)
    }

    /// Returns `true` if the request asks to be authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }

    /// Set the `Authorization` header, replacing any existing value.
    pub fn set_authorization(&mut self, token: &str) -> Result<()> {
        let mut value = HeaderValue::from_str(token)
            .map_err(|_| Error::InvalidInput("Invalid token format".to_string()))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Set a form-encoded body from key/value pairs.
    pub fn form<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        self.body = Some(Bytes::from(body));
        self
    }

    /// The request's method and URL, for error reporting.
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.method.clone(), self.url.clone())
    }
}

/// An HTTP response with its body fully read.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl Response {
    /// Get a header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// The transport requests are sent through.
///
/// Implementations perform exactly one HTTP exchange per call and report
/// connection-level failures as [`Error::Transport`]. Status codes are not
/// interpreted here; the client classifies responses itself.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and read the full response.
    async fn send(&self, request: &Request) -> Result<Response>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: &Request) -> Result<Response> {
        (**self).send(request).await
    }
}

/// Production transport backed by a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport honoring the timeout and user agent of `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &Request) -> Result<Response> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::wrap("HTTP request failed", request.context(), e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            TransportError::wrap(
                "Failed to read response body",
                request.context().with_status(status),
                e,
            )
        })?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

/// Wraps another transport, overriding the host and `User-Agent` of every
/// request before delegating.
///
/// Without a user agent the header is removed, so requests go out without
/// one.
pub struct OverrideTransport<T> {
    inner: T,
    host: Option<String>,
    user_agent: Option<String>,
}

impl<T: HttpTransport> OverrideTransport<T> {
    /// Wrap `inner` without any overrides yet.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            host: None,
            user_agent: None,
        }
    }

    /// Send every request to `host` instead of the host in its URL.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Send every request with this `User-Agent`.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    fn rewrite(&self, request: &Request) -> Result<Request> {
        let mut request = request.clone();

        match &self.user_agent {
            Some(user_agent) => {
                let value = HeaderValue::from_str(user_agent).map_err(|_| {
                    Error::InvalidInput(format!("Invalid user agent: {}", user_agent))
                })?;
                request.headers.insert(USER_AGENT, value);
            }
            None => {
                request.headers.remove(USER_AGENT);
            }
        }

        if let Some(host) = &self.host {
            replace_host(&mut request.url, host)?;
        }

        Ok(request)
    }
}

/// Point `url` at `host`, which may carry a `:port`. Without one, the
/// scheme's default port is used.
fn replace_host(url: &mut Url, host: &str) -> Result<()> {
    let invalid = || Error::InvalidInput(format!("Invalid host: {}", host));

    let target = Url::parse(&format!("{}://{}/", url.scheme(), host)).map_err(|_| invalid())?;
    if target.path() != "/"
        || target.query().is_some()
        || target.fragment().is_some()
        || !target.username().is_empty()
        || target.password().is_some()
    {
        return Err(invalid());
    }

    url.set_host(target.host_str()).map_err(|_| invalid())?;
    url.set_port(target.port()).map_err(|_| invalid())?;
    Ok(())
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for OverrideTransport<T> {
    async fn send(&self, request: &Request) -> Result<Response> {
        let request = self.rewrite(request)?;
        self.inner.send(&request).await
    }
}

impl<T> std::fmt::Debug for OverrideTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideTransport")
            .field("host", &self.host)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
