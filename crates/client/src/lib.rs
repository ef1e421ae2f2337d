//! Terminal host for a single werewolf game.
//!
//! The binary is the composition root: it loads [`config::ClientConfig`],
//! builds a [`werewolf_runtime::Runtime`] with either autoplay or
//! [`input::StdinInputProvider`], and prints the controlled player's view of
//! the log through [`output::Printer`].
pub mod config;
pub mod input;
pub mod output;

use std::io::Write;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use werewolf_core::Winner;
use werewolf_runtime::{PolicyInputProvider, Runtime};

use config::ClientConfig;
use input::StdinInputProvider;
use output::Printer;

/// Plays one game to the end and returns the winning side.
pub async fn play(config: &ClientConfig) -> Result<Winner> {
    let builder = Runtime::builder()
        .config(config.runtime_config())
        .policy_kind(config.policy);
    let mut runtime = if config.interactive {
        builder.provider(StdinInputProvider::new()).build()?
    } else {
        builder
            .provider(PolicyInputProvider::from_kind(config.policy))
            .build()?
    };

    let mut events = runtime.subscribe_events();
    runtime.start().context("failed to deal the table")?;
    let printer = Printer::new(config.output, &runtime.session().view());

    let writer = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        loop {
            match events.recv().await {
                Ok(entry) => {
                    let line = printer.line(&entry)?;
                    writeln!(stdout, "{line}")?;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "printer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
        stdout.flush()?;
        anyhow::Ok(())
    });

    let winner = runtime.run_to_end().await?;
    drop(runtime);
    writer.await.context("printer task panicked")??;
    Ok(winner)
}
