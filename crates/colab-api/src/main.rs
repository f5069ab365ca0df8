//! Agent Colab server entry point.
//!
//! Binary name: `colab`
//!
//! Parses CLI arguments, sets up tracing, resolves configuration and then
//! either prints it or starts the HTTP/WebSocket server.

mod cli;
mod http;
mod state;

use std::path::Path;

use clap::Parser;
use clap_complete::generate;

use colab_infra::config::{data_dir, load_effective_config, resolve_api_key};
use colab_observe::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or config
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "colab", &mut std::io::stdout());
        return Ok(());
    }

    let options = TracingOptions {
        json: cli.json_logs,
        otel: cli.otel,
        ..TracingOptions::from_verbosity(cli.verbose)
    };
    init_tracing(&options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = data_dir();
    let mut config = load_effective_config(&data_dir).await;

    match cli.command {
        Commands::Config => {
            let rendered = cli::config::render_config(&config, &data_dir, env_lookup)?;
            println!("{rendered}");
        }

        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, &data_dir).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

async fn serve(config: colab_types::config::GlobalConfig, data_dir: &Path) -> anyhow::Result<()> {
    let api_key = resolve_api_key(&config.llm, env_lookup);
    let state = AppState::init(&config, data_dir, api_key).await?;
    let router = http::router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        address = %addr,
        model = %config.llm.model,
        max_rounds = config.orchestration.max_rounds,
        "Agent Colab listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
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
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
