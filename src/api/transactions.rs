//! Transactions service for account history.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use super::requests;
use crate::client::paginated::PaginatedStream;
use crate::client::ClientInner;
use crate::models::{
    AccountId, Transaction, TransactionId, TransactionResponse, TransactionsResponse,
};
use crate::Result;

/// Service for transaction history operations.
///
/// # Example
///
/// ```no_run
/// use mondo_rs::api::TransactionsQuery;
/// use mondo_rs::AccountId;
///
/// # async fn example(client: mondo_rs::MondoClient) -> mondo_rs::Result<()> {
/// let query = TransactionsQuery::new(AccountId::new("acc_123"))
///     .limit(10)
///     .expand_merchant();
///
/// for txn in client.transactions().list(&query).await? {
///     let merchant = txn.merchant.as_ref().and_then(|m| m.details()).map(|m| m.name.as_str());
///     println!("{} {} {:?}", txn.amount, txn.currency, merchant);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TransactionsService {
    inner: Arc<ClientInner>,
}

/// Query parameters for listing transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionsQuery {
    /// Account to list transactions for
    pub account_id: AccountId,
    /// Only transactions after this transaction ID or RFC 3339 timestamp
    pub since: Option<String>,
    /// Only transactions created before this time
    pub before: Option<DateTime<Utc>>,
    /// Page size
    pub limit: Option<u32>,
    /// Expand merchant IDs into full merchant records
    pub expand_merchant: bool,
}

impl TransactionsQuery {
    /// Query every transaction of an account.
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            since: None,
            before: None,
            limit: None,
            expand_merchant: false,
        }
    }

    /// Start after a transaction ID or an RFC 3339 timestamp.
    pub fn since(mut self, since: impl Into<String>) -> Self {
        self.since = Some(since.into());
        self
    }

    /// Only include transactions created before `before`.
    pub fn before(mut self, before: DateTime<Utc>) -> Self {
        self.before = Some(before);
        self
    }

    /// Limit the number of transactions per page.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Expand merchant IDs into full merchant records.
    pub fn expand_merchant(mut self) -> Self {
        self.expand_merchant = true;
        self
    }
}

impl TransactionsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Get a single transaction.
    pub async fn get(
        &self,
        transaction_id: &TransactionId,
        expand_merchant: bool,
    ) -> Result<Transaction> {
        let request = requests::transaction(&self.inner.base_url, transaction_id, expand_merchant)?;
        let response: TransactionResponse = self.inner.send_into(request).await?;
        Ok(response.transaction)
    }

    /// Fetch one page of transactions.
    pub async fn list(&self, query: &TransactionsQuery) -> Result<Vec<Transaction>> {
        let request = requests::transactions(&self.inner.base_url, query)?;
        let response: TransactionsResponse = self.inner.send_into(request).await?;
        Ok(response.transactions)
    }

    /// Stream every transaction matching `query`, oldest first.
    ///
    /// Pages of `query.limit` transactions are fetched lazily, each one
    /// starting after the last transaction of the previous page. The stream
    /// ends at the first empty page.
    pub fn stream(&self, query: TransactionsQuery) -> PaginatedStream<Transaction> {
        let inner = self.inner.clone();
        let first = query.since.clone();

        let stream = PaginatedStream::new(move |since: Option<String>| {
            let mut query = query.clone();
            query.since = since;
            Box::pin(fetch_page(inner.clone(), query))
        });

        match first {
            Some(since) => stream.since(since),
            None => stream,
        }
    }

    /// Like [`stream`](Self::stream), but stops as soon as `cancel` is
    /// cancelled, without issuing further requests.
    pub fn stream_with_cancellation(
        &self,
        query: TransactionsQuery,
        cancel: CancellationToken,
    ) -> PaginatedStream<Transaction> {
        self.stream(query).with_cancellation(cancel)
    }

    /// Set metadata keys on a transaction and return the updated
    /// transaction. An empty value deletes the key.
    pub async fn annotate(
        &self,
        transaction_id: &TransactionId,
        metadata: &BTreeMap<String, String>,
    ) -> Result<Transaction> {
        let request =
            requests::annotate_transaction(&self.inner.base_url, transaction_id, metadata)?;
        let response: TransactionResponse = self.inner.send_into(request).await?;
        Ok(response.transaction)
    }
}

async fn fetch_page(inner: Arc<ClientInner>, query: TransactionsQuery) -> Result<Vec<Transaction>> {
    let request = requests::transactions(&inner.base_url, &query)?;
    let response: TransactionsResponse = inner.send_into(request).await?;
    tracing::debug!(
        account_id = %query.account_id,
        since = query.since.as_deref().unwrap_or_default(),
        count = response.transactions.len(),
        "fetched transactions page"
    );
    Ok(response.transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockTransport;
    use crate::{ClientConfig, MondoClient, TokenAuthority};
    use futures_util::StreamExt;

    fn page(ids: &[&str]) -> String {
        let transactions: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    r#"{{"id":"{}","created":"2015-08-22T12:20:18Z","amount":-510,"currency":"GBP"}}"#,
                    id
                )
            })
            .collect();
        format!(r#"{{"transactions":[{}]}}"#, transactions.join(","))
    }

    fn client(transport: Arc<MockTransport>) -> MondoClient {
        MondoClient::with_transport(
            transport,
            Some(TokenAuthority::from_access_token("token")),
            ClientConfig::default(),
        )
        .unwrap()
    }

    fn since(request: &crate::client::Request) -> Option<String> {
        request
            .url
            .query_pairs()
            .find(|(key, _)| key == "since")
            .map(|(_, value)| value.into_owned())
    }

    fn paged() -> Arc<MockTransport> {
        Arc::new(MockTransport::new(|request| {
            let body = match since(request).as_deref() {
                None => page(&["tx_1", "tx_2"]),
                Some("tx_2") => page(&["tx_3", "tx_4"]),
                Some(_) => page(&[]),
            };
            MockTransport::json(200, &body)
        }))
    }

    #[tokio::test]
    async fn test_stream_follows_cursor() {
        let transport = paged();
        let client = client(transport.clone());

        let query = TransactionsQuery::new(AccountId::new("acc_1")).limit(2);
        let ids: Vec<String> = client
            .transactions()
            .stream(query)
            .map(|t| t.unwrap().id.to_string())
            .collect()
            .await;

        assert_eq!(ids, vec!["tx_1", "tx_2", "tx_3", "tx_4"]);
        let cursors: Vec<_> = transport.requests().iter().map(since).collect();
        assert_eq!(
            cursors,
            vec![None, Some("tx_2".to_string()), Some("tx_4".to_string())]
        );
    }

    #[tokio::test]
    async fn test_stream_stops_when_cancelled() {
        let transport = paged();
        let client = client(transport.clone());
        let cancel = CancellationToken::new();

        let mut stream = client.transactions().stream_with_cancellation(
            TransactionsQuery::new(AccountId::new("acc_1")),
            cancel.clone(),
        );
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.id.as_str(), "tx_1");

        cancel.cancel();
        assert!(stream.next().await.is_none());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_stream_yields_error_and_ends() {
        let transport = Arc::new(MockTransport::new(|_| {
            MockTransport::json(500, r#"{"error":"internal_service","message":"oops"}"#)
        }));
        let client = client(transport.clone());

        let results: Vec<_> = client
            .transactions()
            .stream(TransactionsQuery::new(AccountId::new("acc_1")))
            .collect()
            .await;

        assert_eq!(results.len(), 1);
        let err = results[0].as_ref().unwrap_err();
        assert_eq!(err.response_error().unwrap().message, "oops");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_annotate_returns_updated_transaction() {
        let transport = Arc::new(MockTransport::new(|_| {
            MockTransport::json(
                200,
                r#"{"transaction":{"id":"tx_1","created":"2015-08-22T12:20:18Z","amount":-510,
                    "currency":"GBP","metadata":{"foo":"bar"}}}"#,
            )
        }));
        let client = client(transport.clone());

        let mut metadata = BTreeMap::new();
        metadata.insert("foo".to_string(), "bar".to_string());
        let txn = client
            .transactions()
            .annotate(&TransactionId::new("tx_1"), &metadata)
            .await
            .unwrap();

        assert_eq!(txn.metadata.get("foo").map(String::as_str), Some("bar"));
        let sent = &transport.requests()[0];
        assert_eq!(sent.method, reqwest::Method::PATCH);
        assert_eq!(sent.headers[reqwest::header::AUTHORIZATION], "Bearer token");
    }
}
