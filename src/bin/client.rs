// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use crawlq::client::api_client::ApiClient;
use crawlq::client::poll_loop::{ClientEvent, PollConfig, PollLoop, PollOutcome, PollState};
use crawlq::domain::models::job::JobParameters;
use crawlq::domain::models::record::StoredRecord;
use crawlq::utils::telemetry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "crawlq-client")]
#[command(about = "Submit crawl jobs and browse stored records")]
struct Cli {
    /// Job API address
    #[arg(long, env = "CRAWLQ_API_URL", default_value = "http://127.0.0.1:8000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a crawl job and wait for its result
    Submit {
        /// Crawl variant, e.g. wikipedia, quotes or divar_listings
        variant: String,

        /// Job parameter as key=value, may be repeated
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, serde_json::Value)>,

        /// Seconds between status polls
        #[arg(long, default_value_t = 3)]
        interval: u64,

        /// Seconds to wait before giving up
        #[arg(long, default_value_t = 300)]
        timeout: u64,
    },

    /// List stored records of one type, newest first
    List {
        /// Record type, e.g. wikipedia_articles
        record_type: String,
    },
}

/// 解析 `key=value`，值能按JSON解析时保留其类型，否则作为字符串
fn parse_param(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err("parameter name must not be empty".to_string());
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_telemetry();
    let cli = Cli::parse();
    let api = ApiClient::new(cli.server.as_str()).context("failed to build HTTP client")?;

    match cli.command {
        Commands::Submit {
            variant,
            params,
            interval,
            timeout,
        } => {
            let parameters: JobParameters = params.into_iter().collect();
            let config = PollConfig {
                poll_interval: Duration::from_secs(interval.max(1)),
                timeout: Duration::from_secs(timeout),
            };

            let (tx, mut rx) = mpsc::unbounded_channel();
            let handle = PollLoop::new(Arc::new(api), config, tx).spawn(variant, parameters);

            while let Some(event) = rx.recv().await {
                render(event);
            }

            match handle.await? {
                PollOutcome::Succeeded { .. } => Ok(()),
                outcome => Err(anyhow!(outcome.message())),
            }
        }
        Commands::List { record_type } => {
            let records = api.list_records(&record_type).await?;
            println!("{} {} record(s)", records.len(), record_type);
            print_records(&records);
            Ok(())
        }
    }
}

fn render(event: ClientEvent) {
    match event {
        ClientEvent::StateChanged(PollState::Submitting) => println!("submitting job..."),
        ClientEvent::StateChanged(PollState::Polling { job_id }) => {
            println!("job {} queued, waiting for result", job_id)
        }
        ClientEvent::StateChanged(_) => {}
        ClientEvent::Status(status) => println!("job {}: {}", status.job_id, status.state),
        ClientEvent::Finished(outcome) => println!("{}", outcome.message()),
        ClientEvent::RecordsLoaded {
            record_type,
            records,
        } => {
            println!("{} stored {} record(s)", records.len(), record_type);
            print_records(&records);
        }
    }
}

fn print_records(records: &[StoredRecord]) {
    for record in records {
        let title = ["title", "text", "token"]
            .iter()
            .find_map(|field| record.fields.get(*field).and_then(|v| v.as_str()))
            .unwrap_or("");
        println!("  #{:<6} {}", record.id, title);
    }
}
