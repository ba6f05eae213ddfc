//! Request builders for every Mondo endpoint.
//!
//! Each builder resolves its endpoint against a base URL (see
//! [`Environment::api_base_url`](crate::Environment::api_base_url)) and
//! returns a [`Request`] ready for [`MondoClient::send`]. Builders for
//! endpoints that need an access token mark the request as
//! [authenticated](Request::authenticated); the client fills in the token.
//!
//! Form and query parameters are emitted sorted by key, which is the order
//! the API documentation uses.
//!
//! [`MondoClient::send`]: crate::MondoClient::send

use std::collections::BTreeMap;

use chrono::SecondsFormat;
use url::Url;

use crate::client::Request;
use crate::models::{AccountId, FeedItem, TransactionId};
use crate::{Error, Result};

use super::TransactionsQuery;

/// Resolve `segments` below `base`, percent-encoding each segment.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::InvalidInput(format!("Not a valid base URL: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// `GET ping`. Needs no authentication.
pub fn ping(base: &Url) -> Result<Request> {
    Ok(Request::get(endpoint(base, &["ping"])?))
}

/// `GET ping/whoami`: describe the identity of the access token.
pub fn whoami(base: &Url) -> Result<Request> {
    Ok(Request::get(endpoint(base, &["ping", "whoami"])?).authenticated())
}

/// `POST oauth2/token`: exchange a refresh token for a new access token.
pub fn refresh_access(
    base: &Url,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<Request> {
    Ok(Request::post(endpoint(base, &["oauth2", "token"])?).form([
        ("grant_type", "refresh_token"),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
    ]))
}

/// `GET accounts`
pub fn accounts(base: &Url) -> Result<Request> {
    Ok(Request::get(endpoint(base, &["accounts"])?).authenticated())
}

/// `GET balance?account_id=`
pub fn balance(base: &Url, account_id: &AccountId) -> Result<Request> {
    let mut url = endpoint(base, &["balance"])?;
    url.query_pairs_mut()
        .append_pair("account_id", account_id.as_str());
    Ok(Request::get(url).authenticated())
}

/// `GET transactions/{id}`, optionally expanding the merchant.
pub fn transaction(
    base: &Url,
    transaction_id: &TransactionId,
    expand_merchant: bool,
) -> Result<Request> {
    let mut url = endpoint(base, &["transactions", transaction_id.as_str()])?;
    if expand_merchant {
        url.query_pairs_mut().append_pair("expand[]", "merchant");
    }
    Ok(Request::get(url).authenticated())
}

/// `GET transactions`: one page of an account's transactions.
pub fn transactions(base: &Url, query: &TransactionsQuery) -> Result<Request> {
    let mut url = endpoint(base, &["transactions"])?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("account_id", query.account_id.as_str());
        if let Some(before) = &query.before {
            pairs.append_pair("before", &before.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        if query.expand_merchant {
            pairs.append_pair("expand[]", "merchant");
        }
        if let Some(limit) = query.limit.filter(|l| *l > 0) {
            pairs.append_pair("limit", &limit.to_string());
        }
        if let Some(since) = query.since.as_deref().filter(|s| !s.is_empty()) {
            pairs.append_pair("since", since);
        }
    }
    Ok(Request::get(url).authenticated())
}

/// `PATCH transactions/{id}`: set metadata keys on a transaction.
///
/// An empty value deletes the key.
pub fn annotate_transaction(
    base: &Url,
    transaction_id: &TransactionId,
    metadata: &BTreeMap<String, String>,
) -> Result<Request> {
    let url = endpoint(base, &["transactions", transaction_id.as_str()])?;
    let body = metadata
        .iter()
        .map(|(key, value)| (format!("metadata[{}]", key), value.as_str()));
    Ok(Request::patch(url).form(body).authenticated())
}

/// `POST feed`: insert an item into an account's feed.
pub fn create_feed_item(base: &Url, account_id: &AccountId, item: &FeedItem) -> Result<Request> {
    let url = endpoint(base, &["feed"])?;

    let mut body: BTreeMap<String, &str> = item
        .params
        .iter()
        .map(|(key, value)| (format!("params[{}]", key), value.as_str()))
        .collect();
    body.insert("account_id".to_string(), account_id.as_str());
    body.insert("type".to_string(), &item.item_type);
    if let Some(item_url) = item.url.as_deref().filter(|u| !u.is_empty()) {
        body.insert("url".to_string(), item_url);
    }

    Ok(Request::post(url).form(body).authenticated())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
    use reqwest::Method;

    fn base() -> Url {
        Url::parse("https://api.getmondo.co.uk/").unwrap()
    }

    fn body(request: &Request) -> &str {
        std::str::from_utf8(request.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn test_ping_is_unauthenticated() {
        let request = ping(&base()).unwrap();
        assert_eq!(request.url.as_str(), "https://api.getmondo.co.uk/ping");
        assert!(!request.is_authenticated());
    }

    #[test]
    fn test_whoami() {
        let request = whoami(&base()).unwrap();
        assert_eq!(request.url.as_str(), "https://api.getmondo.co.uk/ping/whoami");
        assert!(request.is_authenticated());
    }

    #[test]
    fn test_endpoint_below_base_path() {
        let base = Url::parse("http://127.0.0.1:8080/mondo/").unwrap();
        let request = accounts(&base).unwrap();
        assert_eq!(request.url.as_str(), "http://127.0.0.1:8080/mondo/accounts");
    }

    #[test]
    fn test_refresh_access() {
        let request = refresh_access(&base(), "client", "s3cret", "refresh").unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.as_str(), "https://api.getmondo.co.uk/oauth2/token");
        assert!(!request.headers.contains_key(AUTHORIZATION));
        assert_eq!(request.headers[CONTENT_TYPE], "application/x-www-form-urlencoded");
        assert_eq!(
            body(&request),
            "grant_type=refresh_token&client_id=client&client_secret=s3cret&refresh_token=refresh"
        );
    }

    #[test]
    fn test_balance() {
        let request = balance(&base(), &AccountId::new("acc_123")).unwrap();
        assert_eq!(
            request.url.as_str(),
            "https://api.getmondo.co.uk/balance?account_id=acc_123"
        );
        assert!(request.is_authenticated());
    }

    #[test]
    fn test_transaction() {
        let id = TransactionId::new("trans_456");
        assert_eq!(
            transaction(&base(), &id, false).unwrap().url.as_str(),
            "https://api.getmondo.co.uk/transactions/trans_456"
        );
        assert_eq!(
            transaction(&base(), &id, true).unwrap().url.as_str(),
            "https://api.getmondo.co.uk/transactions/trans_456?expand%5B%5D=merchant"
        );
    }

    #[test]
    fn test_transaction_id_is_escaped() {
        let request = transaction(&base(), &TransactionId::new("a/b"), false).unwrap();
        assert_eq!(request.url.path(), "/transactions/a%2Fb");
    }

    #[test]
    fn test_transactions_first_page() {
        let query = TransactionsQuery::new(AccountId::new("acc_123")).expand_merchant();
        let request = transactions(&base(), &query).unwrap();
        assert_eq!(
            request.url.as_str(),
            "https://api.getmondo.co.uk/transactions?account_id=acc_123&expand%5B%5D=merchant"
        );
    }

    #[test]
    fn test_transactions_page() {
        let query = TransactionsQuery::new(AccountId::new("acc_123"))
            .since("tx_start")
            .before(Utc.with_ymd_and_hms(2016, 3, 1, 0, 0, 0).unwrap())
            .limit(50)
            .expand_merchant();
        let request = transactions(&base(), &query).unwrap();
        assert_eq!(
            request.url.query(),
            Some("account_id=acc_123&before=2016-03-01T00%3A00%3A00Z&expand%5B%5D=merchant&limit=50&since=tx_start")
        );
    }

    #[test]
    fn test_annotate_transaction() {
        let mut metadata = BTreeMap::new();
        metadata.insert("test_a".to_string(), "abc".to_string());
        metadata.insert("test_b".to_string(), String::new());

        let request =
            annotate_transaction(&base(), &TransactionId::new("trans_456"), &metadata).unwrap();

        assert_eq!(request.method, Method::PATCH);
        assert!(request.is_authenticated());
        assert_eq!(body(&request), "metadata%5Btest_a%5D=abc&metadata%5Btest_b%5D=");
    }

    #[test]
    fn test_create_url_feed_item() {
        let item = FeedItem::basic("My feed item", "http://test.com/image.png")
            .url("https://www.google.com");
        let request = create_feed_item(&base(), &AccountId::new("acc_123"), &item).unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.as_str(), "https://api.getmondo.co.uk/feed");
        assert_eq!(
            body(&request),
            "account_id=acc_123&params%5Bimage_url%5D=http%3A%2F%2Ftest.com%2Fimage.png\
             &params%5Btitle%5D=My+feed+item&type=basic&url=https%3A%2F%2Fwww.google.com"
        );
    }

    #[test]
    fn test_create_basic_feed_item() {
        let item = FeedItem::basic("My feed item", "http://test.com/image.png")
            .body("You've created a feed item!")
            .background_color("")
            .title_color("h1-color");
        let request = create_feed_item(&base(), &AccountId::new("acc_123"), &item).unwrap();

        assert_eq!(
            body(&request),
            "account_id=acc_123&params%5Bbody%5D=You%27ve+created+a+feed+item%21\
             &params%5Bimage_url%5D=http%3A%2F%2Ftest.com%2Fimage.png\
             &params%5Btitle%5D=My+feed+item&params%5Btitle_color%5D=h1-color&type=basic"
        );
    }
}
