//! A small chat bot.
//!
//! Answers `!ping`, greets users who run `!hello`, and logs raids.
//!
//! ```text
//! TMI_NICK=mybot TMI_TOKEN=oauth:... TMI_CHANNEL=mychannel cargo run --example simple_bot
//! ```

use anyhow::Context;
use slirc_tmi::{Dispatcher, Session, SessionConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let nick = std::env::var("TMI_NICK").context("TMI_NICK is not set")?;
    let token = std::env::var("TMI_TOKEN").context("TMI_TOKEN is not set")?;
    let channel = std::env::var("TMI_CHANNEL").unwrap_or_else(|_| nick.clone());

    let mut events = Dispatcher::new();
    events
        .on_global_user_state(|_, tags| info!("logged in as {}", tags.display_name))
        .on_channel_command_message("ping", |session, channel, _, _| {
            session.send_message(channel, "pong");
        })
        .on_channel_command_message("hello", |session, channel, user, args| {
            let target = args.first().map(String::as_str).unwrap_or("chat");
            session.send_message(channel, &format!("{} says hello to {}", user, target));
        })
        .on_user_notice(|_, channel, _, tags| {
            if tags.msg_id == "raid" {
                info!("{}: {}", channel, tags.system_msg);
            }
        })
        .on_reconnect(|session| {
            info!("server asked us to reconnect");
            session.close();
        });

    let session = Session::with_dispatcher(SessionConfig::new(nick, token), events);
    session.connect().await?;
    session.join_channel(&channel);

    tokio::select! {
        _ = session.closed() => info!("connection ended"),
        _ = tokio::signal::ctrl_c() => session.close(),
    }
    Ok(())
}
