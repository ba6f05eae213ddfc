//! Accounts service for account and balance operations.

use std::sync::Arc;

use super::requests;
use crate::client::ClientInner;
use crate::models::{Account, AccountCollection, AccountId, Balance};
use crate::Result;

/// Service for account-related operations.
///
/// # Example
///
/// ```no_run
/// # async fn example(client: mondo_rs::MondoClient) -> mondo_rs::Result<()> {
/// for account in client.accounts().list().await? {
///     let balance = client.accounts().balance(&account.id).await?;
///     println!("{}: {} {}", account.description, balance.balance, balance.currency);
/// }
/// # Ok(())
/// # }
/// ```
pub struct AccountsService {
    inner: Arc<ClientInner>,
}

impl AccountsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// List the accounts of the authenticated user.
    pub async fn list(&self) -> Result<Vec<Account>> {
        let request = requests::accounts(&self.inner.base_url)?;
        let response: AccountCollection = self.inner.send_into(request).await?;
        Ok(response.accounts)
    }

    /// Get the current balance of an account.
    pub async fn balance(&self, account_id: &AccountId) -> Result<Balance> {
        let request = requests::balance(&self.inner.base_url, account_id)?;
        self.inner.send_into(request).await
    }
}
