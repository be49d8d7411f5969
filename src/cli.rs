use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::app::{self, AppState};
use crate::auth::{issue_token, Claims};
use crate::billing::StripeClient;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgGateway};
use crate::types::{Role, TenantId};

#[derive(Parser)]
#[command(name = "msp-portal")]
#[command(about = "MSP Portal - multi-tenant storefront and billing API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API (default)")]
    Serve {
        #[arg(long, env = "PORTAL_PORT", help = "Port to listen on")]
        port: Option<u16>,

        #[arg(long, help = "Apply pending database migrations before serving")]
        migrate: bool,
    },

    #[command(about = "Mint a session token for local testing")]
    IssueToken {
        #[arg(long)]
        user_id: Uuid,

        #[arg(long)]
        email: String,

        #[arg(long, help = "Omit only for platform administrators")]
        tenant_id: Option<Uuid>,

        #[arg(long, default_value = "user", help = "admin, tenant_admin or user")]
        role: Role,

        #[arg(long, env = "SESSION_EXPIRY_HOURS", default_value_t = 24)]
        hours: u64,

        #[arg(long, env = "SESSION_JWT_SECRET", hide_env_values = true)]
        secret: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        migrate: false,
    }) {
        Commands::Serve { port, migrate } => serve(port, migrate).await,
        Commands::IssueToken {
            user_id,
            email,
            tenant_id,
            role,
            hours,
            secret,
        } => {
            let claims = Claims::new(user_id, email, tenant_id.map(TenantId), role, hours);
            let token = issue_token(&claims, &secret)?;
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(port: Option<u16>, migrate: bool) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if let Some(port) = port {
        config.api.port = port;
    }
    info!("Starting MSP Portal in {:?} mode", config.environment);
    if config.is_production() && config.security.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("Wildcard CORS origin configured in production");
    }

    let database = DatabaseManager::connect(&config.database)?;
    if migrate {
        database.migrate().await.context("Failed to apply migrations")?;
    }

    let gateway = Arc::new(PgGateway::new(database.pool(), config.database.max_rows));
    let billing = Arc::new(StripeClient::new(&config.billing)?);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let app = app::router(AppState::new(config, gateway, billing));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("MSP Portal listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    database.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
