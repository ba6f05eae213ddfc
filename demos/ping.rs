//! Unauthenticated ping example.
//!
//! This example sends requests without any credentials and shows how API
//! errors are reported.
//!
//! Run with: cargo run --example ping

use mondo_rs::api::requests;
use mondo_rs::{ClientConfig, Error, MondoClient, Request};

#[tokio::main]
async fn main() -> mondo_rs::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let client = MondoClient::new(ClientConfig::default())?;

    // Raw response
    let response = client.send(requests::ping(client.base_url())?).await?;
    println!(
        "Ping response: [{}] {}",
        response.status.as_u16(),
        String::from_utf8_lossy(&response.body)
    );

    // Decoded response
    let identity = client.whoami().await?;
    println!("WhoAmI response: {:?}", identity);

    // API errors are decoded into ResponseError
    match client.accounts().list().await {
        Ok(accounts) => println!("Unexpectedly listed {} accounts", accounts.len()),
        Err(err) => println!("Error: {}", err),
    }

    // A made-up token is reported as invalid
    let request = Request::get(client.base_url().join("accounts")?).bearer(&"ab".repeat(120))?;
    match client.send(request).await {
        Ok(_) => println!("Unexpectedly authenticated"),
        Err(err) => {
            println!("Error: {}", err);
            if let Error::Response(api_err) = &err {
                println!("Invalid token: {}", api_err.is_invalid_token());
            }
        }
    }

    Ok(())
}
