use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use employee_api::auth::{DemoCredentials, TokenService};
use employee_api::config::{self, Config, StoreBackend};
use employee_api::store::memory::MemoryStore;
use employee_api::store::postgres::PgStore;
use employee_api::store::DocumentStore;
use employee_api::{telemetry, AppState};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    telemetry::init()?;

    let result = run(args).await;

    if let Err(ref e) = result {
        tracing::error!("fatal: {:#}", e);
        eprintln!("Error: {:?}", e);
    }
    telemetry::shutdown();
    result
}

async fn run(args: cli::Cli) -> anyhow::Result<()> {
    let cfg = config::load()?;

    match args.command {
        Some(cli::Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(cli::Commands::EnsureSchema) => {
            let store = build_store(&cfg).await?;
            store.ensure_schema().await?;
            println!("Schema ready for collection '{}'.", store.collection());
            Ok(())
        }
        Some(cli::Commands::Token {
            subject,
            ttl_minutes,
        }) => {
            let tokens = token_service(&cfg);
            let ttl = chrono::Duration::minutes(ttl_minutes.unwrap_or(cfg.token_ttl_minutes));
            let token = tokens.issue_with_ttl(&subject, ttl)?;
            println!("{}", token);
            Ok(())
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    }
}

fn token_service(cfg: &Config) -> TokenService {
    TokenService::new(
        cfg.jwt_secret.as_bytes(),
        chrono::Duration::minutes(cfg.token_ttl_minutes),
    )
}

async fn build_store(cfg: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match cfg.store {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db = PgStore::connect(&cfg.database_url, &cfg.collection, cfg.db_max_connections)
                .await
                .context("failed to connect to the employee database")?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; records are lost on exit");
            Ok(Arc::new(MemoryStore::new(cfg.collection.clone())))
        }
    }
}

async fn run_server(cfg: Config, port: u16) -> anyhow::Result<()> {
    let store = build_store(&cfg).await?;

    tracing::info!("Ensuring schema...");
    store.ensure_schema().await?;

    let state = Arc::new(AppState::new(
        store,
        token_service(&cfg),
        Arc::new(DemoCredentials::new(
            cfg.demo_username.clone(),
            cfg.demo_password.clone(),
        )),
    ));

    let app = employee_api::app(state, cfg.dashboard_origin.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Employee API listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
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
