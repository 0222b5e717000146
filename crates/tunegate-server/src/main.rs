use std::net::SocketAddr;
use std::process::ExitCode;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tunegate_auth::TokenValidator;
use tunegate_openai::{InferenceClient, ModelGateway, OpenAiClient, RoutedGateway};
use tunegate_server::{
    AppState, GatewayConfig, PredictBackend, resolve_signing_secret, router, serve,
};
use tunegate_std::SystemEnv;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "tunegate-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env(&SystemEnv)?;
    info!(vault = ?config.vault, "Resolving signing secret");

    let store = config.vault.connect().await?;
    let secret = resolve_signing_secret(&store, &config.vault).await?;
    let validator = TokenValidator::new(secret);

    let provider = OpenAiClient::new(&config.openai).context("failed to build provider client")?;
    match &config.predict_backend {
        PredictBackend::Provider => start(provider, validator, &config).await,
        PredictBackend::Inference(inference) => {
            info!(url = %inference.url, "Predictions served by self-hosted endpoint");
            let predictor =
                InferenceClient::new(inference).context("failed to build inference client")?;
            start(RoutedGateway::new(provider, predictor), validator, &config).await
        }
    }
}

async fn start<G: ModelGateway>(
    gateway: G,
    validator: TokenValidator,
    config: &GatewayConfig,
) -> anyhow::Result<()> {
    let state = AppState::new(
        gateway,
        validator,
        config.predict_model.as_str(),
        config.base_model.as_str(),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "tunegate gateway listening");

    serve(listener, router(state)).await?;
    Ok(())
}
