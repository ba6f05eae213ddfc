//! Transaction listing example.
//!
//! Streams every transaction of the first account, stopping after 120.
//! As with `access_token_auth`, set the MONDO_ACCESS_TOKEN environment
//! variable.
//!
//! Run with: MONDO_ACCESS_TOKEN=<paste> cargo run --example transactions

use futures_util::StreamExt;
use mondo_rs::api::TransactionsQuery;
use mondo_rs::{ClientConfig, MondoClient, TokenAuthority};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> mondo_rs::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let access_token = std::env::var("MONDO_ACCESS_TOKEN")
        .expect("MONDO_ACCESS_TOKEN environment variable required");

    let config = ClientConfig::default().with_user_agent("example/0.1");
    let client =
        MondoClient::with_authority(TokenAuthority::from_access_token(access_token), config)?;

    let accounts = client.accounts().list().await?;
    let Some(account) = accounts.first() else {
        println!("No accounts found");
        return Ok(());
    };

    // 30 transactions per page, from the beginning of the account's history.
    let query = TransactionsQuery::new(account.id.clone())
        .limit(30)
        .expand_merchant();

    let stop = CancellationToken::new();
    let mut transactions = client
        .transactions()
        .stream_with_cancellation(query, stop.clone());

    let mut n = 0;
    while let Some(txn) = transactions.next().await {
        let txn = txn?;
        let json = serde_json::to_string(&txn).expect("transactions serialize to JSON");
        println!("{}: {}", n, json);

        n += 1;
        if n == 120 {
            stop.cancel();
        }
    }

    Ok(())
}
