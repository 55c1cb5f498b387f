use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::protocol::SessionStatus;
use tokio::task::JoinSet;
use tracing::warn;

mod bot;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "http://127.0.0.1:8765")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print score, live task and connected panel count.
    Status,
    Start,
    Stop,
    /// Connect simulated panels that answer their own tasks.
    Bot {
        #[arg(long, default_value_t = 1)]
        count: usize,
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();
    let base = cli.server_url.trim_end_matches('/');
    let http = reqwest::Client::new();

    match cli.command {
        Command::Status => {
            let status = http.get(format!("{base}/status")).send().await;
            print_status(status).await?;
        }
        Command::Start => {
            let status = http.post(format!("{base}/session/start")).send().await;
            print_status(status).await?;
        }
        Command::Stop => {
            let status = http.post(format!("{base}/session/stop")).send().await;
            print_status(status).await?;
        }
        Command::Bot { count, delay_ms } => {
            let url = bot::ws_url(base);
            let delay = Duration::from_millis(delay_ms);
            let mut bots = JoinSet::new();
            for _ in 0..count {
                let url = url.clone();
                bots.spawn(async move { bot::run_bot(&url, delay).await });
            }
            while let Some(joined) = bots.join_next().await {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => warn!(%error, "bot stopped"),
                    Err(error) => warn!(%error, "bot task panicked"),
                }
            }
        }
    }

    Ok(())
}

async fn print_status(response: reqwest::Result<reqwest::Response>) -> Result<()> {
    let status: SessionStatus = response
        .context("server unreachable")?
        .error_for_status()?
        .json()
        .await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
