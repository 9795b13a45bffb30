//! Atelier Kernel
//!
//! HTTP server and administration commands.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use atelier_kernel::cli::{self, Cli, Command};
use atelier_kernel::store::PgStore;
use atelier_kernel::{AppState, Config, db, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command() {
        Command::Serve => serve(config).await,
        Command::CreateAdmin { email, password } => {
            let pool = db::create_pool(&config)
                .await
                .context("failed to create database pool")?;
            db::run_migrations(&pool)
                .await
                .context("failed to run migrations")?;

            let store = PgStore::new(pool);
            let user = cli::create_admin(&store, email, password).await?;
            info!(user_id = %user.id, "administrator ready");
            Ok(())
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!(port = config.port, "Starting Atelier kernel");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    // Expired rate-limit windows are dropped in the background.
    let _sweeper = Arc::clone(state.rate_limiter()).spawn_sweeper(config.rate_limit_sweep_interval);

    let cors = build_cors_layer(&config);

    // Middleware layers (last added = first executed in request flow):
    // TraceLayer → CORS → bearer auth → routes
    let app = routes::build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
