//! HTTP client and service layer for the Mondo API.
//!
//! This module provides the main entry point [`MondoClient`], the
//! [`HttpTransport`] seam requests travel through, and cursor pagination.
//!
//! # Example
//!
//! ```no_run
//! use mondo_rs::{ClientConfig, Environment, MondoClient, TokenAuthority};
//!
//! # async fn example() -> mondo_rs::Result<()> {
//! let config = ClientConfig::default()
//!     .with_environment(Environment::Staging)
//!     .with_user_agent("my-app/1.0");
//! let client = MondoClient::with_authority(
//!     TokenAuthority::from_access_token("access-token"),
//!     config,
//! )?;
//!
//! let identity = client.whoami().await?;
//! println!("authenticated as {}", identity.user_id);
//! # Ok(())
//! # }
//! ```

mod config;
mod http;
#[cfg(test)]
pub(crate) mod mock;
pub mod paginated;
mod transport;

pub use config::ClientConfig;
pub use http::MondoClient;
pub use paginated::{Cursor, PaginatedStream};
pub use transport::{HttpTransport, OverrideTransport, Request, ReqwestTransport, Response};
pub(crate) use http::ClientInner;
