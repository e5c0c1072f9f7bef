use std::net::SocketAddr;
use std::sync::Arc;

use beyond_events::ChangeBus;
use beyond_site::SitePage;
use beyond_store::realtime::RealtimeBridge;
use beyond_store::rest::RestDataStore;
use beyond_store::storage::RestObjectStorage;
use beyond_store::DataStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beyond_api::config::ServerConfig;
use beyond_api::router::build_app_router;
use beyond_api::state::AppState;
use beyond_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "beyond_api=debug,beyond_site=debug,beyond_store=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, store = %config.store.url, "Loaded server configuration");

    // --- Hosted backend clients ---
    let store: Arc<dyn DataStore> = Arc::new(RestDataStore::new(&config.store));
    let storage = Arc::new(
        RestObjectStorage::new(&config.store).expect("Invalid SUPABASE_URL for object storage"),
    );

    // Reads go through the anon key; an unreachable store degrades pages
    // to their error state instead of blocking startup.
    match store.ping().await {
        Ok(()) => tracing::info!("Content store reachable"),
        Err(e) => tracing::warn!(error = %e, "Content store not reachable at startup"),
    }

    // --- Change bus and realtime bridge ---
    let bus = Arc::new(ChangeBus::default());
    let realtime = if config.store.realtime_enabled {
        let handle = RealtimeBridge::new(
            config.store.realtime_url(),
            Arc::clone(&bus),
            SitePage::all_watched_tables(),
        )
        .start();
        tracing::info!("Realtime bridge started");
        Some(handle)
    } else {
        tracing::info!("Realtime bridge disabled; only local writes refresh live pages");
        None
    };

    // --- App state ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let state = AppState::new(config, store, storage, Arc::clone(&bus));
    let ws_manager = Arc::clone(&state.ws_manager);

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    if let Some(handle) = realtime {
        handle.shutdown().await;
    }

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining live page connections");
    ws_manager.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Graceful shutdown complete");
}

/// Wait for Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
