//! Cursor-paginated stream for lazy iteration over API results.
//!
//! Mondo list endpoints page with a `since` cursor: each page is requested
//! with the ID of the last item already seen, and an empty page marks the
//! end. [`PaginatedStream`] drives that loop and yields items one at a time,
//! fetching the next page only once the current one has been consumed.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio_util::sync::CancellationToken;

use crate::models::Transaction;
use crate::Result;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type FetchPage<T> = Box<dyn Fn(Option<String>) -> BoxFuture<'static, Result<Vec<T>>> + Send + Sync>;

/// An item that can serve as the cursor for the page after it.
pub trait Cursor {
    /// The value to send as `since` when requesting items after this one.
    fn cursor(&self) -> String;
}

impl Cursor for Transaction {
    fn cursor(&self) -> String {
        self.id.to_string()
    }
}

/// A stream that lazily fetches cursor-paginated results.
///
/// The stream ends after the first empty page, after the first error (which
/// is yielded), or as soon as its [`CancellationToken`] is cancelled. A
/// cancelled stream makes no further requests and drops any in-flight one.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
/// use mondo_rs::api::TransactionsQuery;
/// use mondo_rs::AccountId;
///
/// # async fn example(client: mondo_rs::MondoClient) -> mondo_rs::Result<()> {
/// let query = TransactionsQuery::new(AccountId::new("acc_123")).limit(100);
/// let mut stream = client.transactions().stream(query);
///
/// while let Some(transaction) = stream.next().await {
///     let transaction = transaction?;
///     println!("{} {}", transaction.amount, transaction.description);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PaginatedStream<T> {
    fetch_page: FetchPage<T>,
    buffer: VecDeque<T>,
    /// Cursor for the next page; `None` before the first page.
    since: Option<String>,
    pending_fetch: Option<BoxFuture<'static, Result<Vec<T>>>>,
    cancelled: Option<BoxFuture<'static, ()>>,
    done: bool,
}

impl<T> PaginatedStream<T>
where
    T: Cursor + Send + 'static,
{
    /// Create a stream from a page fetcher.
    ///
    /// `fetch_page` receives the cursor of the last item yielded so far, or
    /// `None` for the first page.
    pub fn new<F>(fetch_page: F) -> Self
    where
        F: Fn(Option<String>) -> BoxFuture<'static, Result<Vec<T>>> + Send + Sync + 'static,
    {
        Self {
            fetch_page: Box::new(fetch_page),
            buffer: VecDeque::new(),
            since: None,
            pending_fetch: None,
            cancelled: None,
            done: false,
        }
    }

    /// Start from an existing cursor instead of the beginning.
    pub fn since(mut self, cursor: impl Into<String>) -> Self {
        self.since = Some(cursor.into());
        self
    }

    /// Stop the stream when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancelled = Some(Box::pin(token.cancelled_owned()));
        self
    }

    fn poll_cancelled(&mut self, cx: &mut Context<'_>) -> bool {
        match &mut self.cancelled {
            Some(cancelled) => cancelled.as_mut().poll(cx).is_ready(),
            None => false,
        }
    }

    fn finish(&mut self) {
        self.done = true;
        self.buffer.clear();
        self.pending_fetch = None;
    }
}

impl<T> Stream for PaginatedStream<T>
where
    T: Cursor + Send + 'static,
{
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if this.done {
                return Poll::Ready(None);
            }
            if this.poll_cancelled(cx) {
                tracing::debug!("pagination cancelled");
                this.finish();
                return Poll::Ready(None);
            }

            if let Some(item) = this.buffer.pop_front() {
                this.since = Some(item.cursor());
                return Poll::Ready(Some(Ok(item)));
            }

            if let Some(fut) = &mut this.pending_fetch {
                match fut.as_mut().poll(cx) {
                    Poll::Ready(Ok(items)) => {
                        this.pending_fetch = None;
                        if items.is_empty() {
                            this.finish();
                            return Poll::Ready(None);
                        }
                        this.buffer.extend(items);
                        continue;
                    }
                    Poll::Ready(Err(e)) => {
                        this.finish();
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            tracing::trace!(since = ?this.since, "fetching next page");
            this.pending_fetch = Some((this.fetch_page)(this.since.clone()));
        }
    }
}

impl<T> Unpin for PaginatedStream<T> {}

impl<T> std::fmt::Debug for PaginatedStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedStream")
            .field("buffered", &self.buffer.len())
            .field("since", &self.since)
            .field("fetching", &self.pending_fetch.is_some())
            .field("done", &self.done)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use futures_util::StreamExt;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    struct Item(u32);

    impl Cursor for Item {
        fn cursor(&self) -> String {
            format!("item_{}", self.0)
        }
    }

    /// Serves `sizes` as consecutive pages and records the cursor of every
    /// fetch.
    fn paged(sizes: Vec<u32>) -> (PaginatedStream<Item>, Arc<Mutex<Vec<Option<String>>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = calls.clone();
        let stream = PaginatedStream::new(move |since: Option<String>| {
            let mut calls = recorded.lock().unwrap();
            let page = calls.len();
            calls.push(since);
            let start: u32 = sizes.iter().take(page).sum();
            let size = sizes.get(page).copied().unwrap_or(0);
            Box::pin(async move { Ok((start..start + size).map(Item).collect()) })
        });
        (stream, calls)
    }

    #[tokio::test]
    async fn test_reads_until_empty_page() {
        let (stream, calls) = paged(vec![2, 2, 0]);

        let items: Vec<Item> = stream.map(|r| r.unwrap()).collect().await;

        assert_eq!(items, vec![Item(0), Item(1), Item(2), Item(3)]);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![None, Some("item_1".to_string()), Some("item_3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_starts_from_cursor() {
        let (stream, calls) = paged(vec![0]);
        let items: Vec<_> = stream.since("tx_42").collect().await;

        assert!(items.is_empty());
        assert_eq!(*calls.lock().unwrap(), vec![Some("tx_42".to_string())]);
    }

    #[tokio::test]
    async fn test_cancel_after_first_item() {
        let (stream, calls) = paged(vec![2, 2, 0]);
        let token = CancellationToken::new();
        let mut stream = stream.with_cancellation(token.clone());

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, Item(0));
        token.cancel();

        assert!(stream.next().await.is_none());
        assert!(stream.next().await.is_none());
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_makes_no_requests() {
        let (stream, calls) = paged(vec![2]);
        let token = CancellationToken::new();
        token.cancel();

        let items: Vec<_> = stream.with_cancellation(token).collect().await;

        assert!(items.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_fetch() {
        let token = CancellationToken::new();
        let mut stream = PaginatedStream::<Item>::new(|_| {
            Box::pin(futures_util::future::pending())
        })
        .with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            token.cancel();
        });

        assert!(stream.next().await.is_none());
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_stops_after_error() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let mut stream = PaginatedStream::<Item>::new(move |_| {
            *counter.lock().unwrap() += 1;
            Box::pin(async { Err(Error::InvalidInput("boom".to_string())) })
        });

        assert!(matches!(stream.next().await, Some(Err(Error::InvalidInput(_)))));
        assert!(stream.next().await.is_none());
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
