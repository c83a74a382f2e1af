//! Lamsa notification server.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use lamsa_channels::mock::{MockPushGateway, MockSmsGateway};
use lamsa_channels::push::{PushGateway, PushSender};
use lamsa_channels::sms::{SmsGateway, SmsSender};
use lamsa_channels::websocket::WebsocketSender;
use lamsa_channels::email::EmailSender;
use lamsa_channels::ChannelSender;
use lamsa_core::config::AppConfig;
use lamsa_core::error::AppError;
use lamsa_database::repositories::delivery::DeliveryRepository;
use lamsa_database::repositories::recipient::RecipientRepository;
use lamsa_database::store::{DeliveryStore, RecipientDirectory};
use lamsa_dispatch::{NotificationDispatcher, TemplateCatalog};
use lamsa_realtime::ConnectionRegistry;
use lamsa_worker::{ExpirySweeper, RetryScheduler};

#[tokio::main]
async fn main() {
    let env = std::env::var("LAMSA_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Lamsa v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db_pool = lamsa_database::connection::create_pool(&config.database).await?;
    lamsa_database::migration::run_migrations(&db_pool).await?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let store: Arc<dyn DeliveryStore> = Arc::new(DeliveryRepository::new(db_pool.clone()));
    let directory: Arc<dyn RecipientDirectory> =
        Arc::new(RecipientRepository::new(db_pool.clone()));

    // ── Step 3: Connection registry ──────────────────────────────
    let registry = Arc::new(ConnectionRegistry::new(
        config.realtime.max_connections_per_user,
    ));

    // ── Step 4: Channel senders ──────────────────────────────────
    // Gateway names come from configuration; without vendor
    // credentials the mock gateways stand in.
    let sms_providers: Vec<Arc<dyn SmsGateway>> = config
        .sms
        .providers
        .iter()
        .map(|name| Arc::new(MockSmsGateway::succeeding(name.clone())) as Arc<dyn SmsGateway>)
        .collect();
    let push_gateway: Arc<dyn PushGateway> = Arc::new(MockPushGateway::succeeding("mock-push"));

    let senders: Vec<Arc<dyn ChannelSender>> = vec![
        Arc::new(SmsSender::new(sms_providers, &config.sms)),
        Arc::new(PushSender::new(push_gateway, &config.push)),
        Arc::new(WebsocketSender::new(Arc::clone(&registry))),
        Arc::new(EmailSender::new()),
    ];

    // ── Step 5: Dispatcher ───────────────────────────────────────
    let templates = Arc::new(TemplateCatalog::builtin());
    tracing::info!(templates = templates.len(), "Template catalog loaded");

    let dispatcher = Arc::new(NotificationDispatcher::new(
        senders.clone(),
        Arc::clone(&store),
        Arc::clone(&templates),
        config.notifications.clone(),
    ));

    // ── Step 6: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 7: Retry scheduler ──────────────────────────────────
    let retry_handle = if config.retry.enabled {
        let scheduler = RetryScheduler::new(
            Arc::clone(&store),
            Arc::clone(&directory),
            senders,
            config.retry.clone(),
        );
        let cancel = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            scheduler.run(cancel).await;
        }))
    } else {
        tracing::info!("Retry scheduler disabled");
        None
    };

    // ── Step 8: Expiry sweeper ───────────────────────────────────
    let mut sweeper = ExpirySweeper::new(Arc::clone(&store), config.notifications.clone()).await?;
    sweeper.start().await?;

    // ── Step 9: HTTP server ──────────────────────────────────────
    let app_state = lamsa_api::AppState {
        config: Arc::new(config.clone()),
        dispatcher,
        store,
        directory,
        registry,
    };
    let app = lamsa_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Lamsa server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 10: Wait for background tasks ───────────────────────
    tracing::info!("Waiting for background tasks to complete...");

    sweeper.shutdown().await?;
    if let Some(handle) = retry_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }

    tracing::info!("Lamsa server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
