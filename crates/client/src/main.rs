//! Werewolf client binary.
//!
//! # Examples
//!
//! ```bash
//! # Watch a seeded autoplay game
//! WEREWOLF_SEED=7 cargo run -p werewolf-client
//!
//! # Play the seer from the terminal
//! WEREWOLF_INTERACTIVE=1 WEREWOLF_ROLE=seer cargo run -p werewolf-client
//! ```

use anyhow::Result;
use werewolf_client::config::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(
        players = config.players,
        role = ?config.role,
        policy = %config.policy,
        interactive = config.interactive,
        output = %config.output,
        "starting werewolf client"
    );

    let winner = werewolf_client::play(&config).await?;
    tracing::info!(%winner, "client shutdown complete");
    Ok(())
}
