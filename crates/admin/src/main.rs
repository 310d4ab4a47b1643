//! Lechare Admin - Administration panel.
//!
//! This binary serves the admin JSON API on port 3001.
//!
//! # Security
//!
//! - One shared password (`ADMIN_PASSWORD`), hashed with Argon2 at startup
//! - Sees discipline access passwords and student emails
//! - Holds the GitHub token that publishes the disciplines snapshot
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out, CSV for import/export
//! - JSON file store shared with the quiz binary (`LECHARE_DATA_DIR`)
//! - GitHub contents API for publishing

#![cfg_attr(not(test), forbid(unsafe_code))]

use lechare_admin::config::AdminConfig;
use lechare_admin::state::AppState;
use lechare_core::password::hash_password;
use lechare_core::seed;
use lechare_core::store::{FileStore, JsonStore};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = AdminConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lechare_admin=info,lechare_core=info,tower_http=debug".into());

    // LOG_FORMAT=json for structured log parsing in production, text otherwise
    let is_json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Open the store and seed it on first run
    let store: JsonStore = JsonStore::new(Box::new(FileStore::new(&config.data_dir)));
    let report = seed::bootstrap(&store, &config.seed_dir, hash_password);
    if report.has_failures() {
        tracing::warn!("Seed bootstrap incomplete, continuing with what is stored");
    }

    if config.github().is_none() {
        tracing::info!("GITHUB_TOKEN not set, sync disabled");
    }

    let addr = config.socket_addr();
    let state = AppState::new(config, store).expect("Failed to create application state");
    let app = lechare_admin::app(state);

    tracing::info!("admin listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
