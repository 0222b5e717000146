mod cli;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use serde_json::json;
use tracing::error;
use tunegate_auth::{SigningSecret, issue_token};
use tunegate_openai::{
    FineTuneStatus, Hyperparameters, ModelGateway, OpenAiClient, OpenAiConfig, PollOptions,
    await_completion,
};
use tunegate_server::{VaultSettings, resolve_signing_secret};
use tunegate_std::{SystemClock, SystemEnv};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Token {
            sub,
            expires_minutes,
            secret,
        } => {
            let secret = match secret {
                Some(s) => SigningSecret::new(s)?,
                None => {
                    let settings = VaultSettings::from_env(&SystemEnv)?;
                    let store = settings.connect().await?;
                    resolve_signing_secret(&store, &settings).await?
                }
            };
            let ttl = Duration::from_secs(expires_minutes.saturating_mul(60));
            println!("{}", issue_token(&secret, &sub, ttl, &SystemClock)?);
        }
        Command::Upload { path, purpose } => {
            let file_id = provider()?.upload_training_file(&path, &purpose).await?;
            println!("{}", json!({ "file_id": file_id }));
        }
        Command::FineTune { file_id, model } => {
            let job_id = provider()?
                .start_fine_tune(&file_id, &model, &Hyperparameters::default())
                .await?;
            println!("{}", json!({ "fine_tune_id": job_id }));
        }
        Command::Status { job_id } => {
            let job = provider()?.get_status(&job_id).await?;
            println!("{}", serde_json::to_string(&job)?);
        }
        Command::Wait {
            job_id,
            poll_interval,
            timeout,
        } => {
            let options = PollOptions {
                interval: Duration::from_secs(poll_interval),
                timeout: timeout.map(Duration::from_secs),
            };
            let job = await_completion(&provider()?, &job_id, options).await?;
            println!("{}", serde_json::to_string(&job)?);
            if job.status == FineTuneStatus::Failed {
                bail!("fine-tune job {job_id} failed");
            }
        }
    }
    Ok(())
}

fn provider() -> anyhow::Result<OpenAiClient> {
    let config = OpenAiConfig::from_env(&SystemEnv)?;
    OpenAiClient::new(&config).context("failed to build provider client")
}
