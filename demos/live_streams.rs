//! Look up which of the given channels are live through Helix.
//!
//! ```text
//! TWITCH_CLIENT_ID=... TWITCH_CLIENT_SECRET=... cargo run --example live_streams --features api -- foo bar
//! ```

use anyhow::Context;
use slirc_tmi::api::Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client_id = std::env::var("TWITCH_CLIENT_ID").context("TWITCH_CLIENT_ID is not set")?;
    let secret = std::env::var("TWITCH_CLIENT_SECRET").context("TWITCH_CLIENT_SECRET is not set")?;
    let logins: Vec<String> = std::env::args().skip(1).collect();
    let logins: Vec<&str> = logins.iter().map(String::as_str).collect();

    let client = Client::new(client_id, secret);
    let streams = client.streams_by_login(&logins).await?;
    if streams.is_empty() {
        println!("nobody is live");
    }
    for stream in streams {
        println!(
            "{} is live with {} viewers: {} ({})",
            stream.user_name, stream.viewer_count, stream.title, stream.game_name
        );
    }

    for sub in client.subscriptions(true).await? {
        println!("eventsub {} v{} {:?}", sub.kind, sub.version, sub.condition);
    }
    Ok(())
}
