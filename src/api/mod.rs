//! API service modules for Mondo endpoints.
//!
//! [`requests`] builds the raw request for every endpoint. The services pair
//! those builders with the response types they decode into.

mod accounts;
mod feed;
pub mod requests;
mod transactions;

pub use accounts::AccountsService;
pub use feed::FeedService;
pub use transactions::{TransactionsQuery, TransactionsService};
