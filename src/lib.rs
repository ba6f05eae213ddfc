//! # mondo-rs
//!
//! An async Rust client for the Mondo banking API.
//!
//! The client builds authenticated requests, decodes JSON responses into
//! typed models and manages OAuth2 access and refresh tokens for you.
//!
//! ## Features
//!
//! - **Authentication**: access tokens are fetched lazily, refreshed once for
//!   any number of concurrent callers, and refresh tokens are rotated
//! - **Retries**: a request rejected with an invalid token is retried once
//!   with a freshly refreshed token
//! - **Typed errors**: API failures carry the server's error code, message
//!   and trace ID
//! - **Pagination**: transactions stream lazily page by page and can be
//!   cancelled at any point
//! - **Pluggable transport**: swap the HTTP layer through [`HttpTransport`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mondo_rs::{Environment, MondoClient};
//!
//! #[tokio::main]
//! async fn main() -> mondo_rs::Result<()> {
//!     let client = MondoClient::from_refresh_token(
//!         "oauthclient_123",
//!         "client-secret",
//!         "refresh-token",
//!         Environment::Production,
//!     )?;
//!
//!     let accounts = client.accounts().list().await?;
//!     println!("Found {} accounts", accounts.len());
//!
//!     if let Some(account) = accounts.first() {
//!         let balance = client.accounts().balance(&account.id).await?;
//!         println!("Balance: {} {}", balance.balance, balance.currency);
//!     }
//!
//!     // Refresh tokens are single-use; persist the current one.
//!     if let Some(authority) = client.authority() {
//!         println!("next refresh token: {:?}", authority.refresh_token().await);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming Transactions
//!
//! ```rust,no_run
//! use futures_util::StreamExt;
//! use mondo_rs::api::TransactionsQuery;
//! use mondo_rs::{AccountId, Environment, MondoClient};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> mondo_rs::Result<()> {
//!     let client = MondoClient::from_access_token("access-token", Environment::Production)?;
//!     let cancel = CancellationToken::new();
//!
//!     let query = TransactionsQuery::new(AccountId::new("acc_123"))
//!         .limit(50)
//!         .expand_merchant();
//!     let mut transactions = client
//!         .transactions()
//!         .stream_with_cancellation(query, cancel.clone());
//!
//!     while let Some(txn) = transactions.next().await {
//!         let txn = txn?;
//!         println!("{} {} {}", txn.created, txn.amount, txn.description);
//!         if txn.amount < -10_000 {
//!             cancel.cancel();
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;

// Re-export primary types at crate root for convenience
pub use auth::{Credentials, TokenAuthority, TokenExchange};
pub use client::{
    ClientConfig, HttpTransport, MondoClient, OverrideTransport, PaginatedStream, Request,
    ReqwestTransport, Response,
};
pub use error::{Cause, Error, ResponseError, Result, TransportError};
pub use models::{AccountId, Environment, MerchantId, TransactionId};

/// Prelude module for convenient imports.
///
/// ```rust
/// use mondo_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::TransactionsQuery;
    pub use crate::auth::{Credentials, TokenAuthority};
    pub use crate::client::{ClientConfig, MondoClient};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        // Primitives
        AccountId, Environment, MerchantId, TransactionId,
        // Models
        Account, Balance, FeedItem, Identity, Merchant, MerchantDetails, Transaction,
    };
}
