//! Session Console
//!
//! Line-oriented shell over the session pipeline:
//! 1. Loads credentials from the configured file (or keeps them in memory)
//! 2. Guards navigation against the route table
//! 3. Sends API requests with the bound credential attached
//! 4. Clears the credential and redirects to login when the backend answers 401

mod command;
mod config;
mod error;
mod shell;

use anyhow::{Context, Result};
use interceptor::{Pipeline, SessionClient};
use navigation::Navigator;
use session_store::CredentialStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::shell::{Reply, Shell};

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs go to stderr so command output on stdout stays readable
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    info!("starting session-console");

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        base_url = %config.api.base_url,
        timeout_secs = config.api.timeout_secs,
        selection = ?config.session.selection,
        routes = config.routes.len(),
        "configuration loaded"
    );

    let store = match &config.session.credential_file {
        Some(path) => CredentialStore::load(path.clone())
            .await
            .with_context(|| format!("failed to load credentials from {}", path.display()))?,
        None => {
            warn!("no credential_file configured, credentials will not persist");
            CredentialStore::in_memory()
        }
    };
    let store = Arc::new(store);

    let routes = config.route_table().context("failed to build route table")?;
    let navigator = Arc::new(Navigator::new(routes, store.clone()));

    let pipeline = Pipeline::session(store.clone(), navigator.clone(), config.session.selection);
    let http = reqwest::Client::builder()
        .user_agent(concat!("session-console/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;
    let client = SessionClient::new(
        http,
        config.api.base_url.clone(),
        Duration::from_secs(config.api.timeout_secs),
        pipeline,
    );

    let shell = Shell::new(store, navigator, client, config.session.locale);
    println!("session-console ready, type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => match shell.run_line(&line).await {
                    Reply::Text(text) if text.is_empty() => {}
                    Reply::Text(text) => println!("{text}"),
                    Reply::Quit => break,
                },
                Ok(None) => {
                    info!("stdin closed");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "failed to read stdin");
                    break;
                }
            },
        }
    }

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
