//! Read a channel's chat without logging in.
//!
//! ```text
//! cargo run --example anonymous_reader -- somechannel
//! ```

use slirc_tmi::{Dispatcher, Session, SessionConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let channel = std::env::args().nth(1).unwrap_or_else(|| "twitch".to_string());

    let mut events = Dispatcher::new();
    events
        .on_channel_join(|_, channel, user| println!("{} joined {}", user, channel))
        .on_channel_message(|_, channel, user, text, _, tags| {
            let name = if tags.display_name.is_empty() {
                user.to_string()
            } else {
                tags.display_name.clone()
            };
            println!("[{}] {}: {}", channel, name, text);
        })
        .on_clear_chat(|_, channel, target, _| match target {
            Some(user) => println!("[{}] {} was timed out", channel, user),
            None => println!("[{}] chat was cleared", channel),
        });

    let session = Session::with_dispatcher(SessionConfig::anonymous(), events);
    session.connect().await?;
    session.join_channel(&channel);

    tokio::select! {
        _ = session.closed() => {}
        _ = tokio::signal::ctrl_c() => session.close(),
    }
    Ok(())
}
