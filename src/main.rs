//! Devnet Airdrop Faucet Service
//!
//! Lets users request test SOL for a wallet address, behind CAPTCHA
//! verification and multi-dimension sliding-window rate limiting.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌────────────────────────────────────────────────┐
//!                       │                 FAUCET SERVICE                  │
//!                       │                                                 │
//!   POST /api/request   │  ┌─────────┐    ┌───────────────────────────┐  │
//!   ────────────────────┼─▶│  http   │───▶│    admission pipeline     │  │
//!                       │  │ server  │    │  ip → identity → policy   │  │
//!                       │  └─────────┘    │  → fields → bypass        │  │
//!                       │                 │  → captcha → rate limit   │  │
//!                       │                 └──────────┬────────────────┘  │
//!                       │                            │                   │
//!                       │         ┌──────────────────┼────────────────┐  │
//!                       │         ▼                  ▼                ▼  │
//!                       │  ┌────────────┐   ┌──────────────┐  ┌────────┐ │
//!   200/400/429/500     │  │  captcha   │   │  rate-limit  │  │transfer│ │
//!   ◀───────────────────┼──│  verifier  │   │    store     │  │executor│ │
//!                       │  └────────────┘   └──────────────┘  └────────┘ │
//!                       │                                                 │
//!                       │  Cross-cutting: config snapshot, tracing,       │
//!                       │  Prometheus metrics, graceful shutdown          │
//!                       └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use faucet_service::admission::AdmissionPipeline;
use faucet_service::blockchain::{Network, RpcTransferExecutor, Wallet};
use faucet_service::captcha::{TurnstileVerifier, CAPTCHA_SECRET_ENV_VAR};
use faucet_service::config::{load_config, FaucetConfig};
use faucet_service::http::HttpServer;
use faucet_service::identity::HttpIdentityValidator;
use faucet_service::observability::{logging, metrics};
use faucet_service::ratelimit::MemoryRateLimitStore;
use faucet_service::records::HttpTransactionRecorder;

#[derive(Debug, Parser)]
#[command(name = "faucet-service", about = "Devnet airdrop faucet")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => FaucetConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!("faucet-service v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        development_mode = config.development_mode,
        allow_listed_ips = config.allow_list.len(),
        bypass_tokens = config.bypass.len(),
        identity_required = config.identity.required,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let wallet = Wallet::from_env()?;
    let executor = Arc::new(RpcTransferExecutor::new(
        wallet,
        &config.blockchain,
        Duration::from_secs(config.timeouts.transfer_secs),
    ));

    match executor.faucet_balance(Network::Devnet).await {
        Ok(lamports) => tracing::info!(lamports, "Faucet balance on devnet"),
        Err(e) => tracing::warn!(error = %e, "Could not fetch faucet balance"),
    }

    let captcha = Arc::new(
        TurnstileVerifier::from_env(
            config.captcha.verify_url.clone(),
            Duration::from_secs(config.timeouts.captcha_secs),
        )
        .map_err(|_| format!("environment variable {CAPTCHA_SECRET_ENV_VAR} not set"))?,
    );

    let store = Arc::new(MemoryRateLimitStore::with_horizon_ms(
        config.limits.widest_window_ms(),
    ));

    let mut pipeline = AdmissionPipeline::new(&config, captcha, store, executor);

    if config.identity.enabled {
        let validator = HttpIdentityValidator::from_env(
            config.identity.base_url.clone(),
            Duration::from_secs(config.timeouts.identity_secs),
        )
        .map_err(|_| "identity validation enabled but FAUCET_BACKEND_TOKEN not set")?;
        pipeline = pipeline.with_identity_validator(Arc::new(validator));
    }

    if config.records.enabled {
        let recorder = HttpTransactionRecorder::from_env(
            config.records.base_url.clone(),
            Duration::from_secs(config.timeouts.records_secs),
        )
        .map_err(|_| "transaction records enabled but FAUCET_BACKEND_TOKEN not set")?;
        pipeline = pipeline.with_recorder(Arc::new(recorder));
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, Arc::new(pipeline));
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
