// kvwatch - poll keys through a registered storage driver

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::sync::Arc;

use appconf::log::{Logger, LoggerConfig};
use appconf::storage::{register_drivers, Batch, Registry};
use appconf::TypeOptions;
use cli::Cli;

/// Driver logs go to stderr so stdout only carries batches
fn stderr_logger(level: &str) -> Result<Logger> {
    let config = LoggerConfig {
        level: level.to_string(),
        appender: TypeOptions::new("ConsoleAppender", json!({ "target": "stderr" })),
        ..Default::default()
    };
    Logger::new(config).context("Failed to create logger")
}

fn batch_to_json(batch: &Batch) -> serde_json::Value {
    batch
        .iter()
        .map(|data| match &data.err {
            Some(err) => json!({ "key": data.key, "value": data.value, "error": err.to_string() }),
            None => json!({ "key": data.key, "value": data.value }),
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let options = TypeOptions::from_file(&cli.config)
        .with_context(|| format!("Failed to load config file: {}", cli.config))?;
    let logger = Arc::new(stderr_logger(&cli.log_level)?);

    let registry = Registry::new();
    register_drivers(&registry);

    let storage = registry
        .new_from_type_options(logger.clone(), &options)
        .await
        .with_context(|| format!("Failed to open storage {}", options.type_name))?;
    let mut rx = storage.get(cli.keys.clone())?;

    let mut received = 0;
    loop {
        tokio::select! {
            batch = rx.recv() => {
                let Some(batch) = batch else { break };
                let output = batch_to_json(&batch);
                if cli.pretty {
                    println!("{}", serde_json::to_string_pretty(&output)?);
                } else {
                    println!("{}", output);
                }

                received += 1;
                if cli.cycles.is_some_and(|cycles| received >= cycles) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let _ = logger.info("interrupted, stopping storage").await;
                break;
            }
        }
    }

    storage.stop().await?;
    // channel closes after the connection is released
    while rx.recv().await.is_some() {}

    Ok(())
}
