//! Scripted transport for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use super::transport::{HttpTransport, Request, Response};
use crate::Result;

type Handler = Box<dyn Fn(&Request) -> Result<Response> + Send + Sync>;

/// Answers every request with a handler and records what was sent.
pub(crate) struct MockTransport {
    handler: Handler,
    history: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub(crate) fn new<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Response> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            history: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn json(status: u16, body: &str) -> Result<Response> {
        Ok(Response {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.history.lock().unwrap().clone()
    }

    /// Number of requests sent to a URL path, e.g. `/oauth2/token`.
    pub(crate) fn count(&self, path: &str) -> usize {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == path)
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &Request) -> Result<Response> {
        self.history.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}
