//! AgroGuard service binary.

use agroguard_config::AgroGuardConfig;
use agroguard_core::{TokenIssuer, hash_password};
use agroguard_inference::ClassifierHandle;
use agroguard_report::ReportRenderer;
use agroguard_server::{AppState, router};
use agroguard_store::Database;
use anyhow::Context;
use chrono::Duration;
use clap::Parser;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line options for the AgroGuard server.
#[derive(Parser)]
#[command(name = "agroguard-server", version)]
struct Cli {
    /// Optional path to an agroguard.json5 config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Bind address override
    #[arg(long)]
    host: Option<String>,
    /// Listen port override
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    let mut config = if let Some(path) = cli.config.as_ref() {
        let mut config =
            AgroGuardConfig::load_from_path(path).context("failed to load config")?;
        config.apply_env_overrides();
        config.validate().context("invalid config")?;
        config
    } else {
        let cwd = std::env::current_dir().context("failed to resolve working directory")?;
        AgroGuardConfig::load_or_default(&cwd).context("failed to load config")?
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    info!(
        "starting server (db={}, model={}, uploads={}, reports={})",
        config.database.path, config.model.path, config.storage.upload_dir, config.storage.reports_dir
    );
    if !Path::new(&config.model.path).exists() {
        warn!(
            "model artifact not found (path={}); /predict will fail until it is provided",
            config.model.path
        );
    }

    let db = Arc::new(Database::open(&config.database.path).context("failed to open storage")?);
    let demo_hash = hash_password("demo123").context("failed to hash demo password")?;
    if db
        .seed_demo_account(&demo_hash)
        .context("failed to seed demo account")?
        .is_some()
    {
        info!("demo account created: demo@agroguard.com / demo123");
    }

    let classifier = Arc::new(ClassifierHandle::new(&config.model.path));
    let tokens = Arc::new(TokenIssuer::new(
        &config.token_secret(),
        Duration::hours(config.auth.token_ttl_hours),
    ));
    let renderer = Arc::new(
        ReportRenderer::new(&config.storage.reports_dir)
            .context("failed to prepare reports directory")?,
    );
    let state = AppState::new(db, classifier, tokens, renderer, &config.storage.upload_dir)
        .context("failed to prepare upload directory")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening (addr={})", addr);
    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}
