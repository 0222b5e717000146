use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tunegate_openai::DEFAULT_UPLOAD_PURPOSE;

#[derive(Parser, Debug)]
#[command(name = "tunegate-cli", version)]
#[command(about = "Operator tools for the tunegate gateway", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Mint a bearer token accepted by the gateway.
    Token {
        /// Subject the token is issued to.
        #[arg(long)]
        sub: String,

        #[arg(long, default_value_t = 30)]
        expires_minutes: u64,

        /// Signing secret. Read from the secret store (`VAULT_*`) when unset.
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },

    /// Upload a JSONL training file and print its file id.
    Upload {
        path: PathBuf,

        #[arg(long, default_value = DEFAULT_UPLOAD_PURPOSE)]
        purpose: String,
    },

    /// Start a fine-tuning job on an uploaded file and print the job id.
    FineTune {
        file_id: String,

        #[arg(long, env = "TUNEGATE_BASE_MODEL", default_value = "davinci-002")]
        model: String,
    },

    /// Print the current status of a fine-tuning job.
    Status { job_id: String },

    /// Poll a fine-tuning job until it succeeds or fails.
    Wait {
        job_id: String,

        /// Seconds between status checks.
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval: u64,

        /// Give up after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },
}
