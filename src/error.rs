//! Error types for the Mondo API client.
//!
//! Failures fall into three families:
//!
//! - [`Error::NoCredentials`]: the client has nothing it can exchange for an
//!   access token.
//! - [`Error::Transport`]: the exchange with the API did not produce a usable
//!   answer (network failure, unreadable body, token acquisition failure).
//! - [`Error::Response`]: the API answered with a well-formed error document.
//!
//! Only a [`ResponseError`] flagged as an invalid token is ever retried by the
//! client, and only once.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::client::{Request, Response};

/// A specialized `Result` type for Mondo operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The `error` value the API reports when an access token has expired or been
/// revoked.
pub const INVALID_TOKEN: &str = "invalid_token";

/// Response header (`Trace-ID`) carrying the server-assigned trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// The main error type for all Mondo API operations.
///
/// `Error` is cheap to clone: underlying causes are reference counted, so a
/// single failed token refresh can be reported to every caller that was
/// waiting on it.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// No client credentials and refresh token are available to obtain an
    /// access token.
    #[error("mondo: no credentials for generating access token")]
    NoCredentials,

    /// The request could not be completed or its response could not be read.
    #[error(transparent)]
    Transport(Box<TransportError>),

    /// The API returned a well-formed error response.
    #[error(transparent)]
    Response(Box<ResponseError>),

    /// Invalid input provided to a function
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` if the API rejected the access token presented with the
    /// request.
    ///
    /// Only a direct [`ResponseError`] counts. A token refresh that failed
    /// while preparing a request is wrapped in a [`TransportError`] and does
    /// not match, so it can never trigger another refresh.
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, Error::Response(err) if err.is_invalid_token())
    }

    /// Returns `true` if this is an authentication-related error, looking
    /// through wrapped causes.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::NoCredentials => true,
            Error::Response(err) => err.is_invalid_token(),
            Error::Transport(err) => match err.cause() {
                Some(Cause::Inner(inner)) => inner.is_auth_error(),
                _ => false,
            },
            _ => false,
        }
    }

    /// Returns the API error at the root of this error, if any.
    ///
    /// Wrapped causes are followed, so an authentication failure reported by
    /// the token endpoint is still reachable after the client has added its
    /// own context.
    ///
    /// ```
    /// use mondo_rs::Error;
    ///
    /// fn report(err: &Error) {
    ///     if let Some(api_err) = err.response_error() {
    ///         eprintln!("API said {} (trace {})", api_err.message, api_err.trace_id);
    ///     }
    /// }
    /// ```
    pub fn response_error(&self) -> Option<&ResponseError> {
        match self {
            Error::Response(err) => Some(err.as_ref()),
            Error::Transport(err) => match err.cause() {
                Some(Cause::Inner(inner)) => inner.response_error(),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns the trace ID the server assigned to the failed request, if any.
    pub fn trace_id(&self) -> Option<&str> {
        self.response_error()
            .map(|err| err.trace_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Transport(Box::new(err))
    }
}

impl From<ResponseError> for Error {
    fn from(err: ResponseError) -> Self {
        Error::Response(Box::new(err))
    }
}

/// The request (and, once one arrived, the response status) an error
/// happened during.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// HTTP method of the request
    pub method: Method,
    /// Full request URL
    pub url: Url,
    /// Response status, if a response was received
    pub status: Option<StatusCode>,
}

impl RequestContext {
    /// Create a context for a request that has not been answered yet.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            status: None,
        }
    }

    /// Attach the status of the response received for the request.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)?;
        if let Some(status) = self.status {
            write!(f, " => {}", status)?;
        }
        Ok(())
    }
}

/// The underlying failure a [`TransportError`] wraps.
#[derive(Error, Debug, Clone)]
pub enum Cause {
    /// HTTP client failure
    #[error(transparent)]
    Http(Arc<reqwest::Error>),

    /// JSON decoding failure
    #[error(transparent)]
    Json(Arc<serde_json::Error>),

    /// Another library error, e.g. a failed token refresh
    #[error(transparent)]
    Inner(Box<Error>),
}

impl From<reqwest::Error> for Cause {
    fn from(err: reqwest::Error) -> Self {
        Cause::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for Cause {
    fn from(err: serde_json::Error) -> Self {
        Cause::Json(Arc::new(err))
    }
}

impl From<Error> for Cause {
    fn from(err: Error) -> Self {
        Cause::Inner(Box::new(err))
    }
}

/// A failure to complete a request or make sense of its response.
#[derive(Debug, Clone)]
pub struct TransportError {
    /// What the client was doing when it failed
    pub message: String,
    /// The request, and response status if one arrived
    pub context: RequestContext,
    cause: Option<Cause>,
}

impl TransportError {
    /// Create a transport error without an underlying cause.
    pub fn new(message: impl Into<String>, context: RequestContext) -> Self {
        Self {
            message: message.into(),
            context,
            cause: None,
        }
    }

    /// Create a transport error wrapping the failure that caused it.
    pub fn wrap(
        message: impl Into<String>,
        context: RequestContext,
        cause: impl Into<Cause>,
    ) -> Self {
        Self {
            message: message.into(),
            context,
            cause: Some(cause.into()),
        }
    }

    /// The failure that resulted in this error, if any.
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mondo: {}", self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " (caused by: {})", cause)?;
        }
        write!(f, " during {{{}}}", self.context)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// An error document returned by the Mondo API.
#[derive(Debug, Clone)]
pub struct ResponseError {
    /// The request and response status the error was returned for
    pub context: RequestContext,
    /// Server-assigned identifier for correlating the failure with support
    pub trace_id: String,
    /// Machine-readable error code
    pub code: String,
    /// Error category, e.g. `invalid_token` or `bad_request`
    pub error_type: String,
    /// Human-readable description
    pub message: String,
    /// Additional parameters describing the failure
    pub params: HashMap<String, serde_json::Value>,
    invalid_token: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    request_id: Option<String>,
    code: Option<String>,
    error: Option<String>,
    message: Option<String>,
    params: Option<HashMap<String, serde_json::Value>>,
}

impl ResponseError {
    /// Classify a response received for `request`.
    ///
    /// A `200 OK` is a success. Anything else is decoded as an API error
    /// document; a body that cannot be decoded becomes a [`TransportError`]
    /// so it is never mistaken for an invalid-token signal.
    pub fn classify(request: &Request, response: &Response) -> Result<()> {
        if response.status == StatusCode::OK {
            return Ok(());
        }
        Err(Self::decode(request, response))
    }

    /// Decode the error document carried by a non-success response.
    pub fn decode(request: &Request, response: &Response) -> Error {
        let context = request.context().with_status(response.status);

        let body: ErrorBody = match serde_json::from_slice(&response.body) {
            Ok(body) => body,
            Err(err) => {
                let err = TransportError::wrap("Failed to decode error response", context, err);
                return err.into();
            }
        };

        let trace_id = body
            .request_id
            .filter(|id| !id.is_empty())
            .or_else(|| response.header(TRACE_ID_HEADER).map(str::to_string))
            .unwrap_or_default();
        let error_type = body.error.unwrap_or_default();

        ResponseError {
            context,
            trace_id,
            code: body.code.unwrap_or_default(),
            invalid_token: error_type == INVALID_TOKEN,
            error_type,
            message: body.message.unwrap_or_default(),
            params: body.params.unwrap_or_default(),
        }
        .into()
    }

    /// Returns `true` if the API reported the access token as invalid.
    pub fn is_invalid_token(&self) -> bool {
        self.invalid_token
    }

    /// HTTP status of the response, if known.
    pub fn status(&self) -> Option<StatusCode> {
        self.context.status
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mondo: {}", self.message)?;
        if !self.error_type.is_empty() {
            write!(f, " ({})", self.error_type)?;
        }
        write!(f, " during {{{}}} (trace: {})", self.context, self.trace_id)
    }
}

impl std::error::Error for ResponseError {}
