//! OAuth2 access token management.
//!
//! A [`TokenAuthority`] holds the access token for one user and knows how to
//! obtain a new one:
//!
//! - from a refresh token plus OAuth client credentials (recommended), or
//! - not at all, when built from a bare access token.
//!
//! ```no_run
//! use mondo_rs::{Credentials, TokenAuthority};
//!
//! // Refreshable: the first request fetches an access token.
//! let authority = TokenAuthority::new(Credentials::new(
//!     "oauthclient_123",
//!     "client-secret",
//!     "refresh-token",
//! ));
//!
//! // Fixed: copied from the API playground, fails once it expires.
//! let fixed = TokenAuthority::from_access_token("access-token");
//! ```

mod authority;

pub use authority::{Credentials, TokenAuthority, TokenExchange};
