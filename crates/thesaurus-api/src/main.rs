//! thesaurus-api - HTTP API server for the thesaurus

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use thesaurus_api::config::LogConfig;
use thesaurus_api::{build_router, AppState, ServerConfig, StoreBackend};
use thesaurus_core::{ResourceStore, SearchBackend, TenantDirectory};
use thesaurus_db::{Database, MemoryStore, PoolConfig};
use thesaurus_search::{SolrConfig, SolrSearch};

fn init_tracing(log: &LogConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "thesaurus_api=debug,thesaurus_search=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(path) = &log.file {
        let dir = path.parent().unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("thesaurus-api.log");
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file_name));

        if log.json {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                .init();
        } else {
            // no ANSI in files unless asked
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(log.ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log.json {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log.ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    let _file_guard = init_tracing(&config.log);

    info!(
        log_json = config.log.json,
        log_file = config
            .log
            .file
            .as_deref()
            .and_then(|p| p.to_str())
            .unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let (store, store_search, directory): (
        Arc<dyn ResourceStore>,
        Arc<dyn SearchBackend>,
        Arc<dyn TenantDirectory>,
    ) = match config.backend {
        StoreBackend::Memory => {
            let memory = match &config.seed_file {
                Some(path) => {
                    info!(seed_file = %path.display(), "Loading seed data");
                    MemoryStore::from_seed_file(path).await?
                }
                None => MemoryStore::new(),
            };
            let memory = Arc::new(memory);
            info!(resources = memory.len().await, "Using in-memory store");
            (memory.clone(), memory.clone(), memory)
        }
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
            let pool_config = PoolConfig::new().max_connections(config.db_max_connections);
            let db = Database::connect(url, &pool_config).await?;
            db.migrate().await?;
            info!("Database connected and migrated");
            let resources = Arc::new(db.resources);
            (resources.clone(), resources, Arc::new(db.tenants))
        }
    };

    let search: Arc<dyn SearchBackend> = match &config.solr_url {
        Some(url) => {
            let solr_config =
                SolrConfig::new(url.clone()).with_timeout_secs(config.solr_timeout_secs);
            info!(solr_url = %url, "Searching through Solr");
            Arc::new(SolrSearch::new(solr_config, store.clone())?)
        }
        None => {
            info!("SOLR_URL not set, searching the store directly");
            store_search
        }
    };

    let state = AppState::new(store, search, directory);
    let app = build_router(state, &config.allowed_origins);

    let addr = config.bind_address();
    info!(addr = %addr, "Starting thesaurus-api");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
