//! Access token authentication example.
//!
//! To follow this example:
//!
//! 1. Log into the Mondo developer playground
//! 2. Copy the access token it shows
//! 3. Run with: MONDO_ACCESS_TOKEN=<paste> cargo run --example access_token_auth
//!
//! Environment variables can be read by other processes on the machine, so
//! don't use this approach with real credentials on shared hosts.

use mondo_rs::{ClientConfig, MondoClient, TokenAuthority};

#[tokio::main]
async fn main() -> mondo_rs::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let access_token = std::env::var("MONDO_ACCESS_TOKEN")
        .expect("MONDO_ACCESS_TOKEN environment variable required");

    // The host and user agent are rewritten on every request.
    let config = ClientConfig::default()
        .with_host("api.getmondo.co.uk")
        .with_user_agent("example/0.1 (+https://github.com/mondo-rs/mondo-rs)");

    let client =
        MondoClient::with_authority(TokenAuthority::from_access_token(access_token), config)?;

    let accounts = client.accounts().list().await?;
    println!("Found {} account(s):", accounts.len());

    for account in &accounts {
        let balance = client.accounts().balance(&account.id).await?;
        println!(
            "  - {} ({}): {} {}, spent today {}",
            account.description, account.id, balance.balance, balance.currency, balance.spend_today
        );
    }

    Ok(())
}
