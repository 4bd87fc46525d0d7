pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod locale;
pub mod mail;
pub mod services;
pub mod state;

use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub use config::Config;
use db::{NewAccount, Store};
use state::SharedState;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("serve") => run_server(config).await,

        Some("seed") => {
            let active = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(25);
            let inactive = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0);
            cmd_seed(&config, active, inactive).await
        }

        Some("init") => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists.");
            }
            Ok(())
        }

        Some(other) => {
            if other != "help" && other != "--help" && other != "-h" {
                println!("Unknown command: {other}");
                println!();
            }
            print_help();
            Ok(())
        }
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    info!("Roster v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;
    let shared = Arc::new(SharedState::new(config).await?);
    let app = api::router(api::create_app_state(shared));

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("API listening at http://0.0.0.0:{port}/api/1.0");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {e}");
        }
    });

    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {e}"),
    }

    server_handle.abort();
    info!("Server stopped");
    Ok(())
}

/// Seed `user1..userN` accounts directly in active state (no activation
/// flow), plus an optional tail of inactive rows. All share the password
/// `P4ssword`.
async fn cmd_seed(config: &Config, active: u32, inactive: u32) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let password_hash = auth::password::hash("P4ssword", &config.security).await?;

    for i in 1..=(active + inactive) {
        store
            .create_account(NewAccount {
                username: format!("user{i}"),
                email: format!("user{i}@mail.com"),
                password_hash: Some(password_hash.clone()),
                inactive: i > active,
                activation_token: None,
            })
            .await?;
    }

    println!("Seeded {active} active and {inactive} inactive accounts.");
    Ok(())
}

fn print_help() {
    println!("Roster - user account service");
    println!();
    println!("USAGE:");
    println!("  roster [serve]               Start the API server (default)");
    println!("  roster seed [active] [inactive]");
    println!("                               Seed accounts for development");
    println!("  roster init                  Create a default config.toml");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure the database, SMTP, etc.");
    println!("  ROSTER_TOKEN_SECRET overrides the bearer token secret.");
}
