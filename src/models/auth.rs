//! Authentication and identity models.

use serde::{Deserialize, Serialize};

/// Response of the unauthenticated `/ping` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ping {
    /// Usually `"pong"`
    pub ping: String,
}

/// The identity an access token authenticates, from `/ping/whoami`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Whether the presented token was accepted
    pub authenticated: bool,
    /// OAuth client the token was issued to
    #[serde(default)]
    pub client_id: String,
    /// User the token belongs to
    #[serde(default)]
    pub user_id: String,
}

/// Token record returned by `/oauth2/token`.
#[derive(Clone, Deserialize)]
pub struct Token {
    /// The new access token, without scheme
    pub access_token: String,
    /// OAuth client the token was issued to
    #[serde(default)]
    pub client_id: String,
    /// Seconds until the access token expires
    #[serde(default)]
    pub expires_in: u64,
    /// Refresh token to use for the next refresh; the previous one is spent
    #[serde(default)]
    pub refresh_token: String,
    /// Token scheme, e.g. `Bearer`
    #[serde(default)]
    pub token_type: String,
    /// User the token belongs to
    #[serde(default)]
    pub user_id: String,
}

impl Token {
    /// The value to send in the `Authorization` header.
    pub fn authorization(&self) -> String {
        let scheme = if self.token_type.is_empty() {
            "Bearer"
        } else {
            &self.token_type
        };
        format!("{} {}", scheme, self.access_token)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("user_id", &self.user_id)
            .finish()
    }
}
