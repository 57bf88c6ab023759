//! chatkeep CLI and REST API entry point.
//!
//! Binary name: `chatkeep`
//!
//! Parses CLI arguments, loads configuration, initializes the conversation
//! store and services, then dispatches to a command or starts the server.

mod cli;
mod http;
mod state;

use clap::Parser;

use chatkeep_infra::config::load_server_config;
use chatkeep_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_filter(), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_server_config(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }

            let state = AppState::init(&config).await?;

            if state.admin_token_hash.is_none() {
                tracing::warn!(
                    "no admin token configured; conversation listing and API key routes are open"
                );
            }
            if config.production {
                tracing::info!("production mode: API key changes are kept in memory only");
            }

            let addr = config.bind_addr();
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            let conversations = state.chat_gateway.conversation_count().await;

            if !cli.quiet {
                println!(
                    "  {} chatkeep listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!(
                    "  {} {} conversations in {}",
                    console::style("•").dim(),
                    conversations,
                    config.chats_dir().display()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::List => {
            let state = AppState::init(&config).await?;
            cli::conversation::list_conversations(&state, cli.json).await?;
        }

        Commands::Show { id } => {
            let state = AppState::init(&config).await?;
            cli::conversation::show_conversation(&state, &id, cli.json).await?;
        }

        Commands::Delete { id, force } => {
            let state = AppState::init(&config).await?;
            cli::conversation::delete_conversation(&state, &id, force, cli.json).await?;
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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

    tracing::info!("shutdown signal received");
}
