//! Competition scheduler binary entrypoint wiring configuration, storage and the REST layer.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use competition_scheduler_back::{
    config::{AppConfig, StorageBackend},
    dao::roster_store::memory::MemoryRosterStore,
    routes,
    services::seed_service,
    state::{
        AppState, SharedState,
        scheduler::{SeededShuffler, TeamShuffler, ThreadRngShuffler},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let shuffler: Arc<dyn TeamShuffler> = match config.shuffle_seed() {
        Some(seed) => {
            info!(seed, "using seeded team shuffler");
            Arc::new(SeededShuffler::new(seed))
        }
        None => Arc::new(ThreadRngShuffler),
    };
    let app_state = AppState::new(shuffler);

    install_storage(&app_state, config.storage_backend()).await;
    if let Some(seed) = config.seed() {
        tokio::spawn(seed_service::run(app_state.clone(), seed.clone()));
    }

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the configured storage backend, or start its supervisor when it is remote.
async fn install_storage(state: &SharedState, backend: StorageBackend) {
    match backend {
        StorageBackend::Memory => {
            info!("using in-memory storage; data is lost on shutdown");
            state
                .set_roster_store(Arc::new(MemoryRosterStore::new()))
                .await;
        }
        #[cfg(feature = "mongo-store")]
        StorageBackend::Mongo => {
            tokio::spawn(run_mongo_supervisor(state.clone()));
        }
        #[cfg(not(feature = "mongo-store"))]
        StorageBackend::Mongo => {
            warn!("built without the mongo-store feature; falling back to in-memory storage");
            state
                .set_roster_store(Arc::new(MemoryRosterStore::new()))
                .await;
        }
    }
}

/// Keep a MongoDB connection installed, retrying in the background while degraded.
#[cfg(feature = "mongo-store")]
async fn run_mongo_supervisor(state: SharedState) {
    use competition_scheduler_back::{
        dao::{
            roster_store::{
                RosterStore,
                mongodb::{MongoConfig, MongoRosterStore},
            },
            storage::StorageError,
        },
        services::storage_supervisor::{self, Backoff},
    };

    let mongo_uri = env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
    let mongo_db = env::var("MONGO_DB").ok();

    storage_supervisor::run(state, Backoff::default(), move || {
        let uri = mongo_uri.clone();
        let db_name = mongo_db.clone();
        async move {
            let config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
            let store = MongoRosterStore::connect(config).await?;
            Ok::<Arc<dyn RosterStore>, StorageError>(Arc::new(store))
        }
    })
    .await;
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
