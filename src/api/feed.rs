//! Feed service for inserting items into an account's feed.

use std::sync::Arc;

use super::requests;
use crate::client::ClientInner;
use crate::models::{AccountId, FeedItem};
use crate::Result;

/// Service for feed operations.
///
/// # Example
///
/// ```no_run
/// use mondo_rs::models::FeedItem;
/// use mondo_rs::AccountId;
///
/// # async fn example(client: mondo_rs::MondoClient) -> mondo_rs::Result<()> {
/// let item = FeedItem::basic("Hello from Rust", "https://example.com/icon.png")
///     .body("This item was created through the API.");
/// client.feed().create(&AccountId::new("acc_123"), &item).await?;
/// # Ok(())
/// # }
/// ```
pub struct FeedService {
    inner: Arc<ClientInner>,
}

impl FeedService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Insert `item` into the feed of an account.
    pub async fn create(&self, account_id: &AccountId, item: &FeedItem) -> Result<()> {
        let request = requests::create_feed_item(&self.inner.base_url, account_id, item)?;
        self.inner.send(request).await?;
        Ok(())
    }
}
