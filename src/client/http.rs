//! HTTP client implementation for the Mondo API.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{requests, AccountsService, FeedService, TransactionsService};
use crate::auth::{Credentials, TokenAuthority, TokenExchange};
use crate::error::{ResponseError, TransportError};
use crate::models::{Identity, Ping, Token};
use crate::{Environment, Result};

use super::config::ClientConfig;
use super::transport::{HttpTransport, OverrideTransport, Request, ReqwestTransport, Response};

/// The main client for interacting with the Mondo API.
///
/// The client adds Mondo-specific error handling and authentication around
/// an [`HttpTransport`]. Requests marked as authenticated get the current
/// access token from the client's [`TokenAuthority`]; when the API rejects
/// that token, the client refreshes it and retries the request once.
///
/// # Example
///
/// ```no_run
/// use mondo_rs::{MondoClient, Environment};
///
/// # async fn example() -> mondo_rs::Result<()> {
/// let client = MondoClient::from_refresh_token(
///     "oauthclient_123",
///     "client-secret",
///     "refresh-token",
///     Environment::Production,
/// )?;
///
/// let accounts = client.accounts().list().await?;
/// if let Some(account) = accounts.first() {
///     let balance = client.accounts().balance(&account.id).await?;
///     println!("{}: {} {}", account.description, balance.balance, balance.currency);
/// }
/// # Ok(())
/// # }
/// ```
pub struct MondoClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) transport: Arc<dyn HttpTransport>,
    pub(crate) authority: Option<TokenAuthority>,
    pub(crate) base_url: Url,
    pub(crate) config: ClientConfig,
}

impl MondoClient {
    /// Create a client without authentication.
    ///
    /// Only unauthenticated endpoints such as [`ping`](Self::ping) work, and
    /// requests carrying their own `Authorization` header are sent as-is.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = Self::default_transport(&config)?;
        Self::build(transport, None, config)
    }

    /// Create a client that authenticates requests with `authority`.
    pub fn with_authority(authority: TokenAuthority, config: ClientConfig) -> Result<Self> {
        let transport = Self::default_transport(&config)?;
        Self::build(transport, Some(authority), config)
    }

    /// Create a client from an access token, e.g. one copied from the API
    /// playground. The token cannot be refreshed.
    pub fn from_access_token(access_token: impl AsRef<str>, env: Environment) -> Result<Self> {
        Self::with_authority(
            TokenAuthority::from_access_token(access_token),
            ClientConfig::default().with_environment(env),
        )
    }

    /// Create a client that obtains and refreshes access tokens with a
    /// refresh token and OAuth client credentials.
    ///
    /// No request is made until the client is first used.
    pub fn from_refresh_token(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
        env: Environment,
    ) -> Result<Self> {
        Self::with_authority(
            TokenAuthority::new(Credentials::new(client_id, client_secret, refresh_token)),
            ClientConfig::default().with_environment(env),
        )
    }

    /// Create a client on top of a custom transport, e.g. a test double or a
    /// preconfigured [`OverrideTransport`].
    ///
    /// The timeout, user agent and host settings of `config` are left to the
    /// transport.
    pub fn with_transport(
        transport: impl HttpTransport + 'static,
        authority: Option<TokenAuthority>,
        config: ClientConfig,
    ) -> Result<Self> {
        Self::build(Arc::new(transport), authority, config)
    }

    fn build(
        transport: Arc<dyn HttpTransport>,
        authority: Option<TokenAuthority>,
        config: ClientConfig,
    ) -> Result<Self> {
        let base_url = config.base_url()?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                authority,
                base_url,
                config,
            }),
        })
    }

    fn default_transport(config: &ClientConfig) -> Result<Arc<dyn HttpTransport>> {
        let transport = ReqwestTransport::new(config)?;
        let Some(host) = &config.host else {
            return Ok(Arc::new(transport));
        };

        let mut transport = OverrideTransport::new(transport).with_host(host);
        if let Some(user_agent) = &config.user_agent {
            transport = transport.with_user_agent(user_agent);
        }
        Ok(Arc::new(transport))
    }

    /// Send a request and return the raw response.
    ///
    /// Any `Authorization` header on the request is replaced by the token
    /// the client's authority provides. Responses other than `200 OK` are
    /// returned as errors.
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.inner.send(request).await
    }

    /// Send a request and decode the JSON response body into `T`.
    pub async fn send_into<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        self.inner.send_into(request).await
    }

    /// Ping the API. Needs no authentication.
    pub async fn ping(&self) -> Result<Ping> {
        let request = requests::ping(&self.inner.base_url)?;
        self.inner.send_into(request).await
    }

    /// Verify the identity the client authenticates as.
    pub async fn whoami(&self) -> Result<Identity> {
        let request = requests::whoami(&self.inner.base_url)?;
        self.inner.send_into(request).await
    }

    /// Get the accounts service.
    pub fn accounts(&self) -> AccountsService {
        AccountsService::new(self.inner.clone())
    }

    /// Get the transactions service.
    pub fn transactions(&self) -> TransactionsService {
        TransactionsService::new(self.inner.clone())
    }

    /// Get the feed service.
    pub fn feed(&self) -> FeedService {
        FeedService::new(self.inner.clone())
    }

    /// Get the token authority, if the client authenticates requests.
    pub fn authority(&self) -> Option<&TokenAuthority> {
        self.inner.authority.as_ref()
    }

    /// Get the base URL endpoints are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

impl ClientInner {
    pub(crate) async fn send(&self, request: Request) -> Result<Response> {
        match &self.authority {
            Some(authority) if request.is_authenticated() => {
                self.send_authenticated(authority, request).await
            }
            _ => self.dispatch(&request).await,
        }
    }

    pub(crate) async fn send_into<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let context = request.context();
        let response = self.send(request).await?;
        response.json().map_err(|e| {
            TransportError::wrap(
                "Failed to parse response body",
                context.with_status(response.status),
                e,
            )
            .into()
        })
    }

    /// Send with the cached token, then once more with a refreshed token if
    /// the API rejected the first one.
    async fn send_authenticated(
        &self,
        authority: &TokenAuthority,
        mut request: Request,
    ) -> Result<Response> {
        match self.attempt(authority, &mut request, false).await {
            Err(err) if err.is_invalid_token() => {
                tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    trace_id = err.trace_id().unwrap_or_default(),
                    "access token rejected, retrying with a refreshed token"
                );
                self.attempt(authority, &mut request, true).await
            }
            result => result,
        }
    }

    async fn attempt(
        &self,
        authority: &TokenAuthority,
        request: &mut Request,
        force_refresh: bool,
    ) -> Result<Response> {
        let token = authority
            .get_token(force_refresh, self)
            .await
            .map_err(|e| {
                TransportError::wrap(
                    "Failed to get authentication details",
                    request.context(),
                    e,
                )
            })?;
        request.set_authorization(&token)?;
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: &Request) -> Result<Response> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.send(request).await?;
        ResponseError::classify(request, &response)?;
        Ok(response)
    }
}

#[async_trait]
impl TokenExchange for ClientInner {
    async fn refresh_access(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<Token> {
        let request =
            requests::refresh_access(&self.base_url, client_id, client_secret, refresh_token)?;
        self.send_into(request).await
    }
}

#[async_trait]
impl TokenExchange for MondoClient {
    async fn refresh_access(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<Token> {
        self.inner
            .refresh_access(client_id, client_secret, refresh_token)
            .await
    }
}

impl Clone for MondoClient {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for MondoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MondoClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.inner.authority.is_some())
            .field("config", &self.inner.config)
            .finish()
    }
}
