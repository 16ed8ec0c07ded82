//! casefuse-engine - multi-source fusion service
//!
//! Default port 5780. Configuration priority: command line, environment,
//! TOML file, built-in defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use casefuse_common::config::{load_config, resolve_config_path};
use casefuse_engine::config::EngineConfig;
use casefuse_engine::{build_router, AppState, MultiSourceDataEngine};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for casefuse-engine
#[derive(Parser, Debug)]
#[command(name = "casefuse-engine")]
#[command(about = "Multi-source ingestion, scoring and fusion service")]
#[command(version)]
struct Args {
    /// Path to casefuse.toml
    #[arg(short, long, env = "CASEFUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "CASEFUSE_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides the config file)
    #[arg(short, long, env = "CASEFUSE_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Env var already folded into args.config by clap
    let config_path = resolve_config_path(args.config.as_deref(), "CASEFUSE_CONFIG");
    let loaded = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    let toml_config = loaded.config;

    let level = toml_config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("casefuse_engine={level},casefuse_common={level},tower_http={level}")
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting casefuse-engine v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    loaded.origin.log();

    let engine_config = EngineConfig::from_toml(&toml_config);
    info!(
        user_agent = %engine_config.user_agent,
        timeout_secs = engine_config.fetch_timeout.as_secs(),
        max_concurrent_sources = engine_config.max_concurrent_sources,
        vocabulary = engine_config.tag_vocabulary.len(),
        "Engine configured"
    );

    let engine = Arc::new(
        MultiSourceDataEngine::new(engine_config).context("Failed to initialize engine")?,
    );
    let app = build_router(AppState::new(engine));

    let bind = args.bind.unwrap_or(toml_config.bind_address);
    let port = args.port.unwrap_or(toml_config.port);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
