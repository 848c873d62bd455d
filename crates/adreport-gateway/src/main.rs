use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod app;
mod http;
mod signed;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adreport_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit path > ADREPORT_CONFIG env > ~/.adreport/adreport.toml
    let config_path = std::env::var("ADREPORT_CONFIG").ok();
    let config = adreport_core::AdreportConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        adreport_core::AdreportConfig::default()
    });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    // initialize SQLite database
    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let conn = rusqlite::Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    let store = Arc::new(adreport_store::ReportStore::new(conn)?);
    info!("database migrations complete");

    // collaborators for the report pipeline
    let api = Arc::new(adreport_pipeline::HttpAnalyticsApi::new(
        config.analytics.base_url.clone(),
        config.analytics.auth_token.clone(),
    ));
    let summarizer = Arc::new(adreport_pipeline::OpenAiSummarizer::new(
        config.summarizer.api_key.clone(),
        config.summarizer.base_url.clone(),
        config.summarizer.model.clone(),
    ));
    let mailer = Arc::new(adreport_pipeline::SmtpMailer::new(
        &config.smtp.host,
        config.smtp.port,
        config.smtp.username.clone(),
        config.smtp.password.clone(),
        &config.smtp.from,
    )?);

    let pipeline = Arc::new(adreport_pipeline::ReportPipeline::new(
        Arc::clone(&store),
        api,
        summarizer,
        mailer,
        config.links.base_url.clone(),
    ));

    let scheduler = adreport_scheduler::SchedulerService::new(Arc::clone(&store), pipeline);

    // re-arm every non-manual config; the store is the source of truth and
    // the registry is only a cache of what's currently armed
    match scheduler.initialize_on_boot() {
        Ok(armed) => info!(armed, "jobs re-armed from store"),
        Err(e) => tracing::error!("scheduler initialization failed: {e}"),
    }

    let signer = signed::UrlSigner::new(
        config.links.signing_secret.clone(),
        config.links.base_url.clone(),
        config.links.ttl_hours,
    );

    let state = Arc::new(app::AppState::new(store, scheduler, signer));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Adreport gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
