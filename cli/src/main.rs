mod cli;
mod commands;
mod config;
mod format;
mod logging;

use std::io::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};
use btcdata::ChainMetrics;
use clap::Parser;
use cli::{Commands, Line};
use config::Config;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::parse();

    let query = match cli.command {
        Some(Commands::GenerateConfig { output }) => {
            return config::generate_config_template(&output)
                .context("generate config template")
        }
        Some(Commands::Query(query)) => Some(query),
        None => None,
    };

    let config_found = cli.config.exists();
    let mut config = Config::load_or_default(&cli.config).context("load config")?;
    if !cli.sources.is_empty() {
        config.sources.base_urls = cli.sources;
    }

    logging::setup_tracing(config.logging.directory.as_deref()).context("set up tracing")?;
    logging::setup_panic_hook();

    if !config_found {
        info!(
            "config file '{}' not found, using defaults",
            cli.config.display()
        );
    }

    let metrics = Arc::new(config.chain_metrics().context("set up data sources")?);

    match query {
        Some(query) => {
            let reply = commands::run(query, &metrics).await?;
            println!("{reply}");
        }
        None => run_cli(metrics).await.context("run interactive mode")?,
    }

    Ok(())
}

/// Read commands from stdin; each one runs on its own task so a slow source
/// never holds up the next command
async fn run_cli(metrics: Arc<ChainMetrics>) -> Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    let mut running = JoinSet::new();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(input) = lines.next_line().await? else {
            break;
        };
        let parts = input.split_whitespace().collect::<Vec<_>>();
        match parts.as_slice() {
            [] => continue,
            ["exit" | "quit"] => break,
            _ => {}
        }

        let query = match Line::try_parse_from(&parts) {
            Ok(line) => line.query,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        debug!("dispatching {query:?}");

        let metrics = Arc::clone(&metrics);
        running.spawn(async move {
            match commands::run(query, &metrics).await {
                Ok(reply) => print_reply(&reply),
                Err(e) => print_reply(&format!("Error: {e:#}")),
            }
        });

        // reap whatever already finished
        while running.try_join_next().is_some() {}
    }

    while running.join_next().await.is_some() {}

    Ok(())
}

/// Puts `text` where the pending prompt is and shows the prompt again below it
fn reply_line(text: &str) -> String {
    format!("\r{text}\n> ")
}

fn print_reply(text: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(reply_line(text).as_bytes());
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_overwrites_the_prompt_and_restores_it() {
        assert_eq!(reply_line("840100"), "\r840100\n> ");
    }
}
