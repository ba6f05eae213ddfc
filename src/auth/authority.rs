//! Access token cache with coalesced refreshes.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, RwLock};

use crate::models::Token;
use crate::{Error, Result};

/// Exchanges a refresh token for a new access token.
///
/// [`MondoClient`](crate::MondoClient) implements this by posting the
/// refresh-token grant to `/oauth2/token`.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Perform the refresh-token grant.
    async fn refresh_access(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<Token>;
}

/// OAuth client credentials plus the refresh token to start from.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: SecretString,
    refresh_token: SecretString,
}

impl Credentials {
    /// Create credentials for refreshing access tokens.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            refresh_token: SecretString::from(refresh_token.into()),
        }
    }

    /// The OAuth client ID.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Provides the access token for a single user, refreshing it when needed.
///
/// The authority is cheap to clone and safe to share between tasks. Cached
/// tokens are served under a shared lock. Refreshes are serialized: callers
/// that arrive while one is in flight wait for it and receive its outcome
/// instead of starting another.
///
/// # Example
///
/// ```no_run
/// use mondo_rs::{ClientConfig, Credentials, MondoClient, TokenAuthority};
///
/// # async fn example() -> mondo_rs::Result<()> {
/// let authority = TokenAuthority::new(Credentials::new(
///     "oauthclient_123",
///     "client-secret",
///     "refresh-token",
/// ));
/// let client = MondoClient::with_authority(authority.clone(), ClientConfig::default())?;
///
/// let accounts = client.accounts().list().await?;
///
/// // Refresh tokens rotate; persist the latest one.
/// if let Some(refresh_token) = authority.refresh_token().await {
///     println!("store {} securely", refresh_token.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TokenAuthority {
    inner: Arc<AuthorityInner>,
}

struct AuthorityInner {
    client_id: String,
    client_secret: Option<SecretString>,
    state: RwLock<TokenState>,
    refresh: Mutex<()>,
}

struct TokenState {
    /// Authorization header value, e.g. `Bearer abc`; `None` when unknown.
    token: Option<SecretString>,
    refresh_token: Option<SecretString>,
    /// Bumped once per completed refresh attempt.
    epoch: u64,
    last_failure: Option<Error>,
}

impl TokenState {
    fn cached(&self) -> Option<String> {
        self.token.as_ref().map(|t| t.expose_secret().to_string())
    }
}

impl TokenAuthority {
    /// Create an authority that fetches its first access token lazily from
    /// the refresh token in `credentials`.
    pub fn new(credentials: Credentials) -> Self {
        Self::build(
            credentials.client_id,
            Some(credentials.client_secret),
            String::new(),
            Some(credentials.refresh_token),
        )
    }

    /// Create an authority from an existing access token (without the
    /// `Bearer ` prefix). It cannot refresh: once the token expires, requests
    /// fail with [`Error::NoCredentials`].
    pub fn from_access_token(access_token: impl AsRef<str>) -> Self {
        Self::build(
            String::new(),
            None,
            format!("Bearer {}", access_token.as_ref()),
            None,
        )
    }

    /// Create an authority from an existing access token (including its
    /// scheme, e.g. `Bearer abc`) and the credentials to refresh it once it
    /// expires.
    pub fn with_access_token(credentials: Credentials, authorization: impl Into<String>) -> Self {
        Self::build(
            credentials.client_id,
            Some(credentials.client_secret),
            authorization.into(),
            Some(credentials.refresh_token),
        )
    }

    fn build(
        client_id: String,
        client_secret: Option<SecretString>,
        authorization: String,
        refresh_token: Option<SecretString>,
    ) -> Self {
        let token = Some(authorization)
            .filter(|t| !t.is_empty())
            .map(SecretString::from);
        Self {
            inner: Arc::new(AuthorityInner {
                client_id,
                client_secret,
                state: RwLock::new(TokenState {
                    token,
                    refresh_token,
                    epoch: 0,
                    last_failure: None,
                }),
                refresh: Mutex::new(()),
            }),
        }
    }

    /// Return an access token (e.g. `Bearer xyz`), refreshing it through
    /// `exchange` when there is none or `force_refresh` is set.
    ///
    /// # Errors
    ///
    /// - [`Error::NoCredentials`] if a refresh is needed but the client ID,
    ///   client secret or refresh token is missing. No request is made.
    /// - Whatever `exchange` failed with, unchanged.
    pub async fn get_token(
        &self,
        force_refresh: bool,
        exchange: &dyn TokenExchange,
    ) -> Result<String> {
        let observed_epoch = {
            let state = self.inner.state.read().await;
            if let Some(token) = state.cached().filter(|_| !force_refresh) {
                return Ok(token);
            }
            state.epoch
        };

        let _refreshing = self.inner.refresh.lock().await;

        let refresh_token = {
            let mut state = self.inner.state.write().await;

            // Someone else finished a refresh while we waited; share its outcome.
            if state.epoch != observed_epoch {
                if let Some(token) = state.cached() {
                    return Ok(token);
                }
                if let Some(err) = &state.last_failure {
                    return Err(err.clone());
                }
            }

            state.token = None;
            state
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().to_string())
                .filter(|t| !t.is_empty())
        };

        let result = match (self.client_secret(), refresh_token) {
            (Some(client_secret), Some(refresh_token)) if !self.inner.client_id.is_empty() => {
                tracing::debug!(client_id = %self.inner.client_id, "refreshing access token");
                exchange
                    .refresh_access(&self.inner.client_id, client_secret, &refresh_token)
                    .await
            }
            _ => Err(Error::NoCredentials),
        };

        let mut state = self.inner.state.write().await;
        state.epoch += 1;
        match result {
            Ok(token) => {
                let authorization = token.authorization();
                state.token = Some(SecretString::from(authorization.clone()));
                if !token.refresh_token.is_empty() {
                    state.refresh_token = Some(SecretString::from(token.refresh_token));
                }
                state.last_failure = None;
                Ok(authorization)
            }
            Err(err) => {
                tracing::warn!(
                    client_id = %self.inner.client_id,
                    error = %err,
                    "access token refresh failed"
                );
                state.last_failure = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Forget the cached access token; the next request refreshes it.
    pub async fn invalidate(&self) {
        self.inner.state.write().await.token = None;
    }

    /// Returns `true` if an access token is cached.
    pub async fn has_token(&self) -> bool {
        self.inner.state.read().await.token.is_some()
    }

    /// The current refresh token.
    ///
    /// Refresh tokens are single-use: each successful refresh replaces it, so
    /// applications that persist credentials should store this value after
    /// making requests.
    pub async fn refresh_token(&self) -> Option<String> {
        self.inner
            .state
            .read()
            .await
            .refresh_token
            .as_ref()
            .map(|t| t.expose_secret().to_string())
    }

    /// The OAuth client ID, empty for access-token-only authorities.
    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    fn client_secret(&self) -> Option<&str> {
        self.inner
            .client_secret
            .as_ref()
            .map(|s| s.expose_secret())
            .filter(|s| !s.is_empty())
    }
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("client_id", &self.inner.client_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
