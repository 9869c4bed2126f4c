//! Session walk-through against a running alphadesk backend.
//!
//! Signs in, loads the profile and the daily AI quota, then signs out.
//! Credentials are kept in memory only.
//!
//! Run with:
//! ```bash
//! ALPHADESK_API_BASE_URL=http://localhost:3000/api \
//! ALPHADESK_USERNAME=satoshi ALPHADESK_PASSWORD=hunter2 \
//! RUST_LOG=alphadesk=debug cargo run --example session_demo
//! ```

use alphadesk::prelude::*;
use anyhow::Context;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let username = std::env::var("ALPHADESK_USERNAME").context("ALPHADESK_USERNAME not set")?;
    let password = std::env::var("ALPHADESK_PASSWORD").context("ALPHADESK_PASSWORD not set")?;

    let desk = Alphadesk::new(ClientConfig::from_env()?, MemoryTokenStore::new())?;
    println!("Backend: {}\n", desk.client().config().base_url);

    match desk.auth().login(&username, &password).await {
        Ok(auth) => println!("Signed in as {}", auth.user.username),
        Err(e) => {
            println!("Sign-in failed: {}", e.user_message());
            return Ok(());
        }
    }

    let profile = desk.client().profile().await?;
    println!(
        "Profile: {} (tier: {})",
        profile.username,
        profile.tier.as_deref().unwrap_or("free")
    );

    let quota = desk.client().ai_quota().await?;
    println!(
        "AI quota: {} used, {} of {} left, resets {}",
        quota.used, quota.remaining, quota.limit, quota.reset_at
    );

    desk.auth().logout().await;
    println!("\nSigned out; authenticated = {}", desk.auth().is_authenticated());

    Ok(())
}
