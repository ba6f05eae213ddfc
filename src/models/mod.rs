//! Data models for the Mondo API.
//!
//! Models are organized by domain:
//!
//! - [`primitives`] - ID newtypes and the API `Environment`
//! - [`auth`] - Token, identity and ping responses
//! - [`account`] - Account and balance models
//! - [`transaction`] - Transactions and merchants
//! - [`feed`] - Feed items

pub mod account;
pub mod auth;
pub mod feed;
pub mod primitives;
pub mod transaction;

// Re-export commonly used types
pub use account::*;
pub use auth::*;
pub use feed::*;
pub use primitives::*;
pub use transaction::*;
